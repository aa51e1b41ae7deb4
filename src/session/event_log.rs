//! # Event Log
//!
//! Human-readable history of dashboard activity, newest first.
//!
//! Only the most recent entries are kept; anything older than the visible
//! limit is dropped as new entries arrive.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::VecDeque;

/// Severity shown next to an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Info,
    Success,
    Error,
}

/// One event log line
#[derive(Debug, Clone, PartialEq)]
pub struct EventEntry {
    pub level: EventLevel,
    pub text: String,
    pub at: DateTime<Local>,
}

impl EventEntry {
    /// Local time of day as displayed next to the entry
    #[must_use]
    pub fn time_label(&self) -> String {
        self.at.format("%H:%M:%S").to_string()
    }
}

/// Newest-first log limited to `limit` entries
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<EventEntry>,
    limit: usize,
}

impl EventLog {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit + 1),
            limit,
        }
    }

    /// Inserts an entry at position 0 and drops the oldest beyond the limit
    pub fn add(&mut self, level: EventLevel, text: impl Into<String>, at: DateTime<Local>) -> &EventEntry {
        self.entries.push_front(EventEntry {
            level,
            text: text.into(),
            at,
        });
        self.entries.truncate(self.limit);
        &self.entries[0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Most recent entry
    #[must_use]
    pub fn newest(&self) -> Option<&EventEntry> {
        self.entries.front()
    }

    /// Iterates newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = &EventEntry> + '_ {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(sec: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 12, 0, sec).unwrap()
    }

    #[test]
    fn test_newest_entry_is_first() {
        let mut log = EventLog::new(10);
        log.add(EventLevel::Info, "first", at(0));
        log.add(EventLevel::Error, "second", at(1));

        let texts: Vec<_> = log.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["second", "first"]);
        assert_eq!(log.newest().unwrap().level, EventLevel::Error);
    }

    #[test]
    fn test_never_exceeds_limit() {
        let mut log = EventLog::new(10);
        for i in 0..25 {
            log.add(EventLevel::Info, format!("event {}", i), at(i));
            assert!(log.len() <= 10);
            assert_eq!(log.newest().unwrap().text, format!("event {}", i));
        }
        assert_eq!(log.len(), 10);
        assert_eq!(log.iter().last().unwrap().text, "event 15");
    }

    #[test]
    fn test_add_returns_inserted_entry() {
        let mut log = EventLog::new(3);
        let entry = log.add(EventLevel::Success, "connected", at(5));
        assert_eq!(entry.text, "connected");
        assert_eq!(entry.time_label(), "12:00:05");
    }

    #[test]
    fn test_zero_limit_keeps_one_entry() {
        let mut log = EventLog::new(0);
        log.add(EventLevel::Info, "a", at(0));
        log.add(EventLevel::Info, "b", at(1));
        assert_eq!(log.limit(), 1);
        assert_eq!(log.len(), 1);
        assert_eq!(log.newest().unwrap().text, "b");
    }
}
