//! `questlog inspect`: decode one quest list response body.

use crate::cmd::{QuestRow, read_input};
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};
use clap::Args;
use questlog_core::model::{Quest, Tab};
use questlog_core::wire::{PageSnapshot, decode_page};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Response body file (`svdata=` prefix optional), or `-` for stdin.
    pub file: PathBuf,

    /// Tab id the page was requested for (0 = all, 9 = active).
    #[arg(long, default_value_t = Tab::ALL_ID)]
    pub tab: i32,
}

/// An item the decoder or the quest constructor rejected.
#[derive(Debug, Serialize)]
pub struct DiscardedItem {
    pub error_code: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub tab: Tab,
    pub page: i32,
    pub count: i32,
    pub page_count: i32,
    pub exec_count: i32,
    /// False when the page carried no `api_list` at all.
    pub list_present: bool,
    pub quests: Vec<QuestRow>,
    pub discarded: Vec<DiscardedItem>,
}

impl InspectReport {
    pub fn from_page(page: &PageSnapshot) -> Self {
        let mut quests = Vec::new();
        let mut discarded = Vec::new();
        for item in page.items.iter().flatten() {
            let quest = item
                .as_ref()
                .map_err(Clone::clone)
                .and_then(|raw| Quest::from_raw(raw.clone()));
            match quest {
                Ok(quest) => quests.push(QuestRow::from_quest(&quest)),
                Err(err) => discarded.push(DiscardedItem {
                    error_code: err.code().to_string(),
                    error: err.to_string(),
                }),
            }
        }
        Self {
            tab: page.tab,
            page: page.page,
            count: page.count,
            page_count: page.page_count,
            exec_count: page.exec_count,
            list_present: page.items.is_some(),
            quests,
            discarded,
        }
    }
}

/// Execute `questlog inspect <file>`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its envelope does not
/// decode.
pub fn run_inspect(args: &InspectArgs, output: OutputMode) -> anyhow::Result<()> {
    let payload = read_input(&args.file)?;
    let page = match decode_page(&payload, Tab::from_id(args.tab)) {
        Ok(page) => page,
        Err(err) => {
            render_error(output, &CliError::with_code(err.to_string(), err.code()))?;
            anyhow::bail!("{}: {err}", err.code());
        }
    };
    let report = InspectReport::from_page(&page);
    render_mode(output, &report, render_text, render_pretty)
}

fn render_text(report: &InspectReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "tab={} page={}/{} count={} exec_count={} list={}",
        report.tab,
        report.page,
        report.page_count,
        report.count,
        report.exec_count,
        if report.list_present { "present" } else { "absent" }
    )?;
    for row in &report.quests {
        writeln!(w, "{}\t{}\t{}\t{}", row.id, row.category, row.state, row.title)?;
    }
    for item in &report.discarded {
        writeln!(w, "discarded\t{}\t{}", item.error_code, item.error)?;
    }
    Ok(())
}

fn render_pretty(report: &InspectReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Quest list page")?;
    pretty_kv(w, "Tab", format!("{} ({})", report.tab, report.tab.id()))?;
    pretty_kv(w, "Page", format!("{} of {}", report.page, report.page_count))?;
    pretty_kv(w, "Count", report.count.to_string())?;
    pretty_kv(w, "Exec count", report.exec_count.to_string())?;
    if !report.list_present {
        pretty_kv(w, "List", "absent")?;
    }
    writeln!(w)?;

    pretty_section(w, &format!("Quests ({})", report.quests.len()))?;
    for row in &report.quests {
        row.write_line(w)?;
    }

    if !report.discarded.is_empty() {
        writeln!(w)?;
        pretty_section(w, &format!("Discarded ({})", report.discarded.len()))?;
        for item in &report.discarded {
            writeln!(w, "[{}] {}", item.error_code, item.error)?;
        }
    }
    Ok(())
}
