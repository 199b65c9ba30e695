//! Rolling log of player-facing event messages.
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::constants::MESSAGE_LIFETIME_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub text: String,
    pub kind: MessageKind,
    /// Host clock when the message was recorded.
    pub at_ms: u64,
}

impl JournalEntry {
    #[must_use]
    pub const fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.at_ms)
    }

    #[must_use]
    pub const fn is_visible(&self, now_ms: u64) -> bool {
        self.age_ms(now_ms) < MESSAGE_LIFETIME_MS
    }
}

/// Bounded message log; the oldest entry is dropped once capacity is reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    entries: VecDeque<JournalEntry>,
    capacity: usize,
    clock_ms: u64,
}

impl Journal {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            clock_ms: 0,
        }
    }

    /// Stamp subsequent entries with this host time.
    pub const fn set_clock(&mut self, now_ms: u64) {
        self.clock_ms = now_ms;
    }

    #[must_use]
    pub const fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn push(&mut self, kind: MessageKind, text: impl Into<String>) {
        // A loaded save may carry a zero capacity.
        while self.entries.len() >= self.capacity.max(1) {
            self.entries.pop_front();
        }
        self.entries.push_back(JournalEntry {
            text: text.into(),
            kind,
            at_ms: self.clock_ms,
        });
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(MessageKind::Info, text);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(MessageKind::Success, text);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(MessageKind::Warning, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(MessageKind::Error, text);
    }

    pub fn critical(&mut self, text: impl Into<String>) {
        self.push(MessageKind::Critical, text);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&JournalEntry> {
        self.entries.back()
    }

    /// Entries still on screen at `now_ms`.
    pub fn visible(&self, now_ms: u64) -> impl Iterator<Item = &JournalEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.is_visible(now_ms))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when any entry contains `needle`.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        self.entries.iter().any(|entry| entry.text.contains(needle))
    }
}
