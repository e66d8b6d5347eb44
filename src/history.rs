//! Completed-game history stored as JSON
//!
//! Stored in the platform data directory (e.g. ~/.local/share/blockfall/history.json).

use crate::score::Score;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Most records kept on disk; older ones are dropped first
pub const MAX_RECORDS: usize = 100;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One finished game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Local time the game started, `YYYY-MM-DD HH:MM:SS`
    pub start_time: String,
    pub end_time: String,
    /// Wall-clock length as `MM:SS`
    pub duration: String,
    pub level: u32,
    pub score: u64,
    pub lines: u32,
}

impl GameRecord {
    pub fn new(started_at: DateTime<Local>, ended_at: DateTime<Local>, score: &Score) -> Self {
        let seconds = (ended_at - started_at).num_seconds().max(0);
        Self {
            start_time: started_at.format(TIME_FORMAT).to_string(),
            end_time: ended_at.format(TIME_FORMAT).to_string(),
            duration: format!("{:02}:{:02}", seconds / 60, seconds % 60),
            level: score.level,
            score: score.points,
            lines: score.lines,
        }
    }
}

/// Append-only log of finished games
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    records: Vec<GameRecord>,
}

impl History {
    /// Get the default history file path
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "blockfall", "blockfall")
            .map(|dirs| dirs.data_dir().join("history.json"))
    }

    /// Load history, treating a missing, empty or unreadable file as empty
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!("Ignoring history at {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let records: Vec<GameRecord> = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Self::from_records(records))
    }

    /// Keep only the most recent MAX_RECORDS of `records`
    pub fn from_records(mut records: Vec<GameRecord>) -> Self {
        if records.len() > MAX_RECORDS {
            records.drain(..records.len() - MAX_RECORDS);
        }
        Self { records }
    }

    /// Write history as pretty JSON, creating the parent directory if needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let text = serde_json::to_string_pretty(&self.records)?;
        fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Add a record, dropping the oldest once over MAX_RECORDS
    pub fn append(&mut self, record: GameRecord) {
        self.records.push(record);
        if self.records.len() > MAX_RECORDS {
            let excess = self.records.len() - MAX_RECORDS;
            self.records.drain(..excess);
        }
    }

    /// Forget every record and remove the file
    pub fn clear(&mut self, path: &Path) -> Result<()> {
        self.records.clear();
        if path.exists() {
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
    }

    /// Records in insertion order
    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records for display, latest start time first
    pub fn sorted_newest_first(&self) -> Vec<&GameRecord> {
        let mut sorted: Vec<&GameRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        sorted
    }
}

/// Load, append and save in one step. Failures are logged, never fatal.
pub fn record_game(path: &Path, record: GameRecord) -> History {
    let mut history = History::load(path);
    history.append(record);
    match history.save(path) {
        Ok(()) => tracing::info!("Saved game record to {}", path.display()),
        Err(e) => tracing::error!("Could not save history: {:#}", e),
    }
    history
}
