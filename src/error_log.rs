//! Visible error log
//!
//! Load and save failures are appended here with a client-side timestamp,
//! newest first. The area starts hidden and becomes visible on the first
//! entry; it is never hidden again by the engine.

use chrono::{DateTime, Local};

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub at: DateTime<Local>,
    pub message: String,
}

impl ErrorEntry {
    /// `"{timestamp}\n{message}\n\n"`, one block of the log area
    pub fn render(&self) -> String {
        format!("{}\n{}\n\n", self.at.format("%-m/%-d/%Y, %-I:%M:%S %p"), self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    /// Newest first
    entries: Vec<ErrorEntry>,
    visible: bool,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.push_at(Local::now(), message);
    }

    pub fn push_at(&mut self, at: DateTime<Local>, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "error logged");
        self.entries.insert(0, ErrorEntry { at, message });
        self.visible = true;
    }

    pub fn report(&mut self, error: &ApiError) {
        self.push(error.log_text());
    }

    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&ErrorEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whole text of the log area
    pub fn text(&self) -> String {
        self.entries.iter().map(ErrorEntry::render).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn hidden_until_the_first_error() {
        let mut log = ErrorLog::new();
        assert!(!log.is_visible());

        log.report(&ApiError::Status {
            status: 500,
            body: "boom".into(),
        });
        assert!(log.is_visible());
        assert_eq!(log.latest().unwrap().message, "boom");
    }

    #[test]
    fn newest_entry_renders_first() {
        let mut log = ErrorLog::new();
        let first = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let second = Local.with_ymd_and_hms(2024, 3, 5, 14, 8, 0).unwrap();
        log.push_at(first, "older");
        log.push_at(second, "newer");

        assert_eq!(
            log.text(),
            "3/5/2024, 2:08:00 PM\nnewer\n\n3/5/2024, 2:07:09 PM\nolder\n\n"
        );
    }
}
