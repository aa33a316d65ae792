use std::{fs, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use surety_common::error::{Result, SuretyError};

use super::command::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Completed,
    Failed,
}

/// One processed command, in sequencer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub job_id: Uuid,
    pub seq: u64,
    pub command: Command,
    pub status: JobStatus,
    pub err_msg: Option<String>,
    pub executed_at: DateTime<Utc>,
}

/// Append-only record of every command the sequencer processed, failed ones included.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<JournalEntry>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failed(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().filter(|e| e.status == JobStatus::Failed)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let journal: Journal = serde_json::from_str(&data)?;
        journal.check_sequence()?;
        Ok(journal)
    }

    /// Sequence numbers must start at 1 and have no gaps.
    pub fn check_sequence(&self) -> Result<()> {
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.seq != i as u64 + 1 {
                return Err(SuretyError::Runtime(format!(
                    "Journal out of order at position {}: seq {}",
                    i, entry.seq
                )));
            }
        }
        Ok(())
    }
}
