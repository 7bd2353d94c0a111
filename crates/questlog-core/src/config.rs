use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ErrorCode;
use crate::grouper::PAGE_SIZE;

/// Project config location relative to a root directory.
pub const PROJECT_CONFIG: &str = ".questlog/config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } | Self::Parse { .. } => ErrorCode::ConfigParseError,
            Self::Invalid { .. } => ErrorCode::InvalidConfigValue,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QuestlogConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Quests per remote page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Log the full store before and after every merge at debug level.
    #[serde(default)]
    pub log_store_dumps: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            log_store_dumps: false,
        }
    }
}

impl EngineConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `page_size` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "engine.page_size",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

const fn default_page_size() -> usize {
    PAGE_SIZE
}

/// Parse and validate config text. `origin` is only used in error messages.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the text is not valid TOML for this schema
/// or a value is out of range.
pub fn parse_config(text: &str, origin: &Path) -> Result<QuestlogConfig, ConfigError> {
    let config = toml::from_str::<QuestlogConfig>(text).map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;
    config.engine.validate()?;
    Ok(config)
}

/// Load config from an explicit file.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or parsed.
pub fn load_config_file(path: &Path) -> Result<QuestlogConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text, path)
}

/// Resolve config for `root`: `.questlog/config.toml` under `root`, else the
/// user config (`<config dir>/questlog/config.toml`), else defaults.
///
/// # Errors
///
/// Returns a [`ConfigError`] if an existing file cannot be read or parsed.
pub fn load_config(root: &Path) -> Result<QuestlogConfig, ConfigError> {
    let project = root.join(PROJECT_CONFIG);
    if project.exists() {
        return load_config_file(&project);
    }

    let Some(config_dir) = dirs::config_dir() else {
        return Ok(QuestlogConfig::default());
    };
    let user = config_dir.join("questlog/config.toml");
    if user.exists() {
        return load_config_file(&user);
    }

    Ok(QuestlogConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_text_yields_defaults() {
        let config = parse_config("", Path::new("inline")).expect("parse");
        assert_eq!(config, QuestlogConfig::default());
        assert_eq!(config.engine.page_size, 5);
        assert!(!config.engine.log_store_dumps);
        assert!(config.output.is_none());
    }

    #[test]
    fn partial_engine_section_keeps_other_defaults() {
        let config = parse_config("[engine]\nlog_store_dumps = true\n", Path::new("inline"))
            .expect("parse");
        assert!(config.engine.log_store_dumps);
        assert_eq!(config.engine.page_size, 5);
    }

    #[test]
    fn output_is_read() {
        let config = parse_config("output = \"json\"\n", Path::new("inline")).expect("parse");
        assert_eq!(config.output.as_deref(), Some("json"));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = parse_config("[engine]\npage_size = 0\n", Path::new("inline"))
            .expect_err("page_size 0 is invalid");
        assert_eq!(err.code(), ErrorCode::InvalidConfigValue);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = parse_config("[engine\n", Path::new("broken.toml")).expect_err("bad toml");
        assert_eq!(err.code(), ErrorCode::ConfigParseError);
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn project_file_is_loaded_from_root() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(dir.path().join(".questlog")).expect("mkdir");
        std::fs::write(
            dir.path().join(PROJECT_CONFIG),
            "[engine]\npage_size = 10\n",
        )
        .expect("write");

        let config = load_config(dir.path()).expect("load");
        assert_eq!(config.engine.page_size, 10);
    }

    #[test]
    fn missing_explicit_file_is_a_read_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = load_config_file(&dir.path().join("nope.toml")).expect_err("missing");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
