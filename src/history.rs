//! Line history for termline
//!
//! A bounded, deduplicating sequence of past lines. While a line is being
//! edited the newest slot holds a live copy of the in-progress buffer, so
//! navigating between entries never loses edits made to the entry being
//! left. Entries persist to a newline-delimited text file created with
//! owner-only permissions.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use crate::error::{LineError, Result};

/// Default maximum number of entries.
pub const DEFAULT_HISTORY_MAX_LEN: usize = 100;

/// Bounded line history, oldest entry first.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    max_len: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            max_len: DEFAULT_HISTORY_MAX_LEN,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Append a line. Skipped when the history is disabled (`max_len == 0`)
    /// or the line equals the most recent entry; the oldest entry is evicted
    /// when at capacity.
    pub fn add(&mut self, line: &str) -> bool {
        if self.max_len == 0 {
            return false;
        }
        if self.entries.back().is_some_and(|last| last == line) {
            return false;
        }
        if self.entries.len() == self.max_len {
            self.entries.pop_front();
        }
        self.entries.push_back(line.to_string());
        true
    }

    /// Change the capacity, discarding the oldest entries when shrinking
    /// below the current length. Zero is rejected.
    pub fn set_max_len(&mut self, len: usize) -> Result<()> {
        if len < 1 {
            return Err(LineError::InvalidArgument("history length must be at least 1"));
        }
        while self.entries.len() > len {
            self.entries.pop_front();
        }
        self.max_len = len;
        Ok(())
    }

    /// Entry at `index` steps back from the newest (0 is the newest).
    pub fn from_latest(&self, index: usize) -> Option<&str> {
        let n = self.entries.len();
        if index < n {
            Some(&self.entries[n - 1 - index])
        } else {
            None
        }
    }

    /// Overwrite the entry at `index` steps back from the newest. Used to
    /// keep the slot being navigated away from in sync with the live buffer.
    pub fn replace_from_latest(&mut self, index: usize, line: &str) {
        let n = self.entries.len();
        if index < n {
            self.entries[n - 1 - index] = line.to_string();
        }
    }

    /// Drop the newest entry (the live-line placeholder).
    pub fn pop_newest(&mut self) {
        self.entries.pop_back();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Write all entries, newline-terminated and in insertion order, to a
    /// new or truncated file readable and writable only by the owner.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(LineError::HistoryFile)?;
        for entry in &self.entries {
            writeln!(file, "{entry}").map_err(LineError::HistoryFile)?;
        }
        Ok(())
    }

    /// Read newline-delimited records, each truncated at the first `\r` or
    /// `\n`, feeding them through [`History::add`] so deduplication and the
    /// capacity bound apply.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path).map_err(LineError::HistoryFile)?;
        let reader = BufReader::new(file);
        for line in reader.lines() {
            let line = line.map_err(LineError::HistoryFile)?;
            let record = match line.find(|c| c == '\r' || c == '\n') {
                Some(end) => &line[..end],
                None => line.as_str(),
            };
            self.add(record);
        }
        Ok(())
    }
}
