pub mod inspect;
pub mod replay;

use anyhow::Context;
use questlog_core::model::Quest;
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::Path;

/// One quest as shown by every command.
#[derive(Debug, Clone, Serialize)]
pub struct QuestRow {
    pub id: i32,
    pub category: String,
    pub state: String,
    pub title: String,
}

impl QuestRow {
    pub fn from_quest(quest: &Quest) -> Self {
        Self {
            id: quest.id(),
            category: quest.category().to_string(),
            state: quest.state().to_string(),
            title: quest.title().to_string(),
        }
    }

    pub fn write_line(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{:>5}  {:<9} {:<12} {}",
            self.id, self.category, self.state, self.title
        )
    }
}

/// Read an input file, `-` meaning stdin.
pub fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}
