use std::fmt;

/// Machine-readable error codes for the failure classes the engine tolerates.
///
/// None of these ever reach the event source: the tracker logs them and
/// keeps its last known good state. They exist so logs and CLI output can
/// name a failure without parsing prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidConfigValue,
    PayloadNotUtf8,
    PayloadNotJson,
    EnvelopeMissingData,
    EnvelopeBadCounter,
    RequestFieldMissing,
    EnvelopeBadList,
    EnvelopeCounterOutOfRange,
    ItemUndecodable,
    ItemUnknownState,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::InvalidConfigValue => "E1002",
            Self::PayloadNotUtf8 => "E2001",
            Self::PayloadNotJson => "E2002",
            Self::EnvelopeMissingData => "E2003",
            Self::EnvelopeBadCounter => "E2004",
            Self::RequestFieldMissing => "E2005",
            Self::EnvelopeBadList => "E2006",
            Self::EnvelopeCounterOutOfRange => "E2007",
            Self::ItemUndecodable => "E3001",
            Self::ItemUnknownState => "E3002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidConfigValue => "Invalid config value",
            Self::PayloadNotUtf8 => "Quest list payload is not UTF-8",
            Self::PayloadNotJson => "Quest list payload is not JSON",
            Self::EnvelopeMissingData => "Quest list payload has no api_data",
            Self::EnvelopeBadCounter => "Quest list counter missing or not an integer",
            Self::RequestFieldMissing => "Request body field missing or invalid",
            Self::EnvelopeBadList => "Quest list api_list is not an array",
            Self::EnvelopeCounterOutOfRange => "Quest list counter out of range",
            Self::ItemUndecodable => "Quest list item could not be decoded",
            Self::ItemUnknownState => "Quest list item has an unknown state",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .questlog/config.toml and retry."),
            Self::InvalidConfigValue => Some("page_size must be at least 1."),
            Self::PayloadNotUtf8 | Self::PayloadNotJson | Self::EnvelopeMissingData => {
                Some("The event was dropped; a later quest list refresh restores the state.")
            }
            Self::EnvelopeBadCounter | Self::EnvelopeBadList | Self::EnvelopeCounterOutOfRange => {
                Some("Check the capture for a truncated or rewritten response body.")
            }
            Self::RequestFieldMissing => {
                Some("Capture the request body together with the response.")
            }
            Self::ItemUndecodable | Self::ItemUnknownState => None,
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    const ALL: [ErrorCode; 12] = [
        ErrorCode::ConfigParseError,
        ErrorCode::InvalidConfigValue,
        ErrorCode::PayloadNotUtf8,
        ErrorCode::PayloadNotJson,
        ErrorCode::EnvelopeMissingData,
        ErrorCode::EnvelopeBadCounter,
        ErrorCode::RequestFieldMissing,
        ErrorCode::EnvelopeBadList,
        ErrorCode::EnvelopeCounterOutOfRange,
        ErrorCode::ItemUndecodable,
        ErrorCode::ItemUnknownState,
        ErrorCode::InternalUnexpected,
    ];

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn codes_ascend_in_declaration_order() {
        for pair in ALL.windows(2) {
            assert!(
                pair[0].code() < pair[1].code(),
                "{} is declared before {}",
                pair[0].code(),
                pair[1].code()
            );
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::EnvelopeMissingData.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }
}
