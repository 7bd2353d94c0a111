//! `questlog replay`: feed a captured event stream through a tracker.
//!
//! The input holds one [`InboundEvent`] per line as JSON. Blank lines are
//! ignored; lines that do not parse are reported and skipped so one bad
//! capture line never hides the rest of a session.

use crate::cmd::{QuestRow, read_input};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use clap::Args;
use questlog_core::config::EngineConfig;
use questlog_core::{CurrentEntry, HandleOutcome, InboundEvent, QuestTracker};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// JSON-lines event file, or `-` for stdin.
    pub file: PathBuf,

    /// Record the views after every event.
    #[arg(long)]
    pub step: bool,
}

/// Outcome counters for a replay.
#[derive(Debug, Default, Serialize)]
pub struct ReplayCounts {
    pub events: usize,
    pub merged: usize,
    pub reset: usize,
    pub dropped: usize,
    pub claimed: usize,
    pub stopped: usize,
    /// Claims and stops naming an id the tracker did not hold.
    pub missed: usize,
    /// Page items discarded while merging.
    pub discarded_items: usize,
}

impl ReplayCounts {
    fn record(&mut self, outcome: &HandleOutcome) {
        self.events += 1;
        match outcome {
            HandleOutcome::Merged(stats) => {
                self.merged += 1;
                self.discarded_items += stats.discarded;
            }
            HandleOutcome::Reset { .. } => self.reset += 1,
            HandleOutcome::Dropped { .. } => self.dropped += 1,
            HandleOutcome::Claimed { removed } => {
                self.claimed += 1;
                if !removed {
                    self.missed += 1;
                }
            }
            HandleOutcome::Stopped { found } => {
                self.stopped += 1;
                if !found {
                    self.missed += 1;
                }
            }
        }
    }
}

/// A line that could not be parsed as an event.
#[derive(Debug, Serialize)]
pub struct SkippedLine {
    pub line: usize,
    pub error: String,
}

/// Views after one event, recorded with `--step`.
#[derive(Debug, Serialize)]
pub struct StepRow {
    pub line: usize,
    pub kind: &'static str,
    pub outcome: String,
    pub all: Vec<i32>,
    pub current: Vec<Option<i32>>,
}

/// Final state of a replay.
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub counts: ReplayCounts,
    pub skipped: Vec<SkippedLine>,
    pub untaken: bool,
    pub empty: bool,
    /// Quests per page the slots were located with.
    pub page_size: usize,
    pub exec_slots: usize,
    pub all: Vec<QuestRow>,
    pub current: Vec<Option<QuestRow>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepRow>,
}

/// Execute `questlog replay <file>`.
///
/// # Errors
///
/// Returns an error if the input cannot be read or output rendering fails.
/// Unparseable lines are not errors.
pub fn run_replay(
    args: &ReplayArgs,
    config: &EngineConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let input = read_input(&args.file)?;
    let text = String::from_utf8_lossy(&input);
    let report = replay_lines(&text, config, args.step);
    info!(
        events = report.counts.events,
        skipped = report.skipped.len(),
        "replay finished"
    );
    render_mode(output, &report, render_text, render_pretty)
}

/// Replay every line of `text` through a fresh tracker.
pub fn replay_lines(text: &str, config: &EngineConfig, step: bool) -> ReplayReport {
    let mut tracker = QuestTracker::new(config.clone());
    let mut counts = ReplayCounts::default();
    let mut skipped = Vec::new();
    let mut steps = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        let event = match serde_json::from_str::<InboundEvent>(line) {
            Ok(event) => event,
            Err(err) => {
                warn!(line = line_no, error = %err, "skipping unparseable event line");
                skipped.push(SkippedLine {
                    line: line_no,
                    error: err.to_string(),
                });
                continue;
            }
        };

        let outcome = tracker.apply(&event);
        counts.record(&outcome);
        if step {
            steps.push(StepRow {
                line: line_no,
                kind: event.kind(),
                outcome: describe(&outcome),
                all: tracker.all().iter().map(questlog_core::Quest::id).collect(),
                current: tracker
                    .current()
                    .iter()
                    .map(|entry| entry.quest().map(questlog_core::Quest::id))
                    .collect(),
            });
        }
    }

    ReplayReport {
        counts,
        skipped,
        untaken: tracker.is_untaken(),
        empty: tracker.is_empty(),
        page_size: tracker.config().page_size,
        exec_slots: tracker.exec_slots(),
        all: tracker.all().iter().map(QuestRow::from_quest).collect(),
        current: tracker.current().iter().map(current_row).collect(),
        steps,
    }
}

fn current_row(entry: &CurrentEntry) -> Option<QuestRow> {
    entry.quest().map(QuestRow::from_quest)
}

fn describe(outcome: &HandleOutcome) -> String {
    match outcome {
        HandleOutcome::Merged(stats) => format!(
            "merged (removed {}, inserted {}, kept {}, discarded {})",
            stats.removed, stats.inserted, stats.kept_existing, stats.discarded
        ),
        HandleOutcome::Reset { cleared } => format!("reset (cleared {cleared})"),
        HandleOutcome::Dropped { code, reason } => format!("dropped [{code}] {reason}"),
        HandleOutcome::Claimed { removed: true } => "claimed".to_string(),
        HandleOutcome::Claimed { removed: false } => "claimed (not held)".to_string(),
        HandleOutcome::Stopped { found: true } => "stopped".to_string(),
        HandleOutcome::Stopped { found: false } => "stopped (not held)".to_string(),
    }
}

fn format_ids<T: std::fmt::Display>(ids: impl IntoIterator<Item = Option<T>>) -> String {
    let parts: Vec<String> = ids
        .into_iter()
        .map(|id| id.map_or_else(|| "?".to_string(), |id| id.to_string()))
        .collect();
    format!("[{}]", parts.join(","))
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_text(report: &ReplayReport, w: &mut dyn Write) -> io::Result<()> {
    for step in &report.steps {
        writeln!(
            w,
            "{}\t{}\t{}\tall={}\tcurrent={}",
            step.line,
            step.kind,
            step.outcome,
            format_ids(step.all.iter().map(Some)),
            format_ids(step.current.iter().copied()),
        )?;
    }
    for skipped in &report.skipped {
        writeln!(w, "skipped\tline {}\t{}", skipped.line, skipped.error)?;
    }
    let counts = &report.counts;
    writeln!(
        w,
        "events={} merged={} reset={} dropped={} claimed={} stopped={} missed={} skipped={}",
        counts.events,
        counts.merged,
        counts.reset,
        counts.dropped,
        counts.claimed,
        counts.stopped,
        counts.missed,
        report.skipped.len()
    )?;
    writeln!(
        w,
        "untaken={} empty={} exec_slots={}",
        report.untaken, report.empty, report.exec_slots
    )?;
    writeln!(
        w,
        "all={}",
        format_ids(report.all.iter().map(|row| Some(row.id)))
    )?;
    writeln!(
        w,
        "current={}",
        format_ids(report.current.iter().map(|row| row.as_ref().map(|row| row.id)))
    )
}

fn render_pretty(report: &ReplayReport, w: &mut dyn Write) -> io::Result<()> {
    if !report.steps.is_empty() {
        pretty_section(w, "Steps")?;
        for step in &report.steps {
            writeln!(w, "line {:<5} {:<14} {}", step.line, step.kind, step.outcome)?;
            writeln!(
                w,
                "           all={} current={}",
                format_ids(step.all.iter().map(Some)),
                format_ids(step.current.iter().copied())
            )?;
        }
        writeln!(w)?;
    }

    pretty_section(w, "Replay")?;
    let counts = &report.counts;
    pretty_kv(w, "Events", counts.events.to_string())?;
    pretty_kv(
        w,
        "Pages",
        format!(
            "{} merged, {} reset, {} dropped, {} items discarded",
            counts.merged, counts.reset, counts.dropped, counts.discarded_items
        ),
    )?;
    pretty_kv(
        w,
        "Handled",
        format!(
            "{} claims, {} stops, {} not held",
            counts.claimed, counts.stopped, counts.missed
        ),
    )?;
    pretty_kv(w, "Skipped", report.skipped.len().to_string())?;
    for skipped in &report.skipped {
        writeln!(w, "  line {}: {}", skipped.line, skipped.error)?;
    }
    pretty_kv(w, "Untaken", report.untaken.to_string())?;
    pretty_kv(w, "Empty", report.empty.to_string())?;
    pretty_kv(w, "Page size", report.page_size.to_string())?;
    pretty_kv(w, "Exec slots", report.exec_slots.to_string())?;
    writeln!(w)?;

    pretty_section(w, &format!("All quests ({})", report.all.len()))?;
    for row in &report.all {
        row.write_line(w)?;
    }
    writeln!(w)?;

    pretty_section(w, &format!("Current ({})", report.current.len()))?;
    for row in &report.current {
        match row {
            Some(row) => row.write_line(w)?,
            None => writeln!(w, "{:>5}  (not yet seen)", "?")?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{"kind":"page_received","tab":0,"payload":"svdata={\"api_result\":1,\"api_data\":{\"api_count\":2,\"api_page_count\":1,\"api_disp_page\":1,\"api_exec_count\":1,\"api_list\":[{\"api_no\":201,\"api_type\":1,\"api_state\":2,\"api_title\":\"a\"},{\"api_no\":205,\"api_type\":1,\"api_state\":1,\"api_title\":\"b\"}]}}"}"#;

    #[test]
    fn replay_reports_final_views() {
        let text = format!("{PAGE}\n{{\"kind\":\"item_claimed\",\"quest_id\":201}}\n");
        let report = replay_lines(&text, &EngineConfig::default(), false);

        assert_eq!(report.counts.events, 2);
        assert_eq!(report.counts.merged, 1);
        assert_eq!(report.counts.claimed, 1);
        assert!(!report.untaken);
        assert_eq!(report.all.iter().map(|row| row.id).collect::<Vec<_>>(), vec![205]);
        assert_eq!(report.current.len(), 1);
        assert!(report.current[0].is_none());
        assert!(report.steps.is_empty());
    }

    #[test]
    fn report_carries_configured_page_size() {
        let config = EngineConfig {
            page_size: 3,
            ..EngineConfig::default()
        };
        let report = replay_lines(PAGE, &config, false);
        assert_eq!(report.page_size, 3);

        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["page_size"], 3);
    }

    #[test]
    fn bad_lines_are_skipped_and_reported() {
        let text = format!("not json\n\n{PAGE}\n{{\"kind\":\"warp\"}}\n");
        let report = replay_lines(&text, &EngineConfig::default(), false);

        assert_eq!(report.counts.events, 1);
        let lines: Vec<usize> = report.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![1, 4]);
    }

    #[test]
    fn step_mode_records_each_event() {
        let text = format!(
            "{PAGE}\n{{\"kind\":\"quest_stopped\",\"quest_id\":999}}\n{{\"kind\":\"quest_stopped\",\"quest_id\":201}}\n"
        );
        let report = replay_lines(&text, &EngineConfig::default(), true);

        assert_eq!(report.steps.len(), 3);
        assert_eq!(report.steps[0].all, vec![201, 205]);
        assert_eq!(report.steps[0].current, vec![Some(201)]);
        assert_eq!(report.steps[1].outcome, "stopped (not held)");
        assert_eq!(report.steps[2].current, vec![None]);
        assert_eq!(report.counts.missed, 1);
    }

    #[test]
    fn text_rendering_lists_ids() {
        let report = replay_lines(PAGE, &EngineConfig::default(), false);
        let mut buf = Vec::new();
        render_text(&report, &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("all=[201,205]"));
        assert!(text.contains("current=[201]"));
    }

    #[test]
    fn placeholders_render_as_question_marks() {
        assert_eq!(format_ids([Some(3), None]), "[3,?]");
    }
}
