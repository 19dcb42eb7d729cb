// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of CamperDash.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use std::fmt;
use std::sync::Arc;

use camper_types::{Message, Severity};
use parking_lot::RwLock;
use ringbuffer::{AllocRingBuffer, RingBuffer};
use tracing::debug;

/// Messages kept before the oldest is evicted
pub const MAX_MESSAGES: usize = 14;

/// Shared, bounded log of user-facing messages.
///
/// Cloning yields another handle to the same log. Pushing past capacity
/// evicts the oldest entry.
#[derive(Clone)]
pub struct MessageLog {
    buffer: Arc<RwLock<AllocRingBuffer<Message>>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::with_capacity(MAX_MESSAGES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Arc::new(RwLock::new(AllocRingBuffer::new(capacity.max(1)))),
        }
    }

    pub fn push(&self, message: Message) {
        let evicted = self.buffer.write().enqueue(message);
        if let Some(old) = evicted {
            debug!("Message log full, evicted: {}", old.text);
        }
    }

    pub fn add(&self, severity: Severity, text: impl Into<String>, details: Option<String>) {
        self.push(Message::new(severity, text, details));
    }

    pub fn info(&self, text: impl Into<String>) {
        self.add(Severity::Info, text, None);
    }

    pub fn warning(&self, text: impl Into<String>) {
        self.add(Severity::Warning, text, None);
    }

    pub fn error(&self, text: impl Into<String>, details: Option<String>) {
        self.add(Severity::Error, text, details);
    }

    /// Most recently pushed message
    pub fn latest(&self) -> Option<Message> {
        self.buffer.read().iter().last().cloned()
    }

    /// All retained messages, newest first
    pub fn recent(&self) -> Vec<Message> {
        let mut messages: Vec<Message> = self.buffer.read().iter().cloned().collect();
        messages.reverse();
        messages
    }

    pub fn len(&self) -> usize {
        self.buffer.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.read().capacity()
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MessageLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageLog")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_is_newest_first() {
        let log = MessageLog::new();
        log.info("first");
        log.warning("second");
        log.error("third", Some("details".to_owned()));

        let texts: Vec<_> = log.recent().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["third", "second", "first"]);

        let latest = log.latest().unwrap();
        assert_eq!(latest.severity, Severity::Error);
        assert_eq!(latest.details.as_deref(), Some("details"));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let log = MessageLog::new();
        for i in 0..20 {
            log.info(format!("message {i}"));
        }

        assert_eq!(log.len(), MAX_MESSAGES);
        let recent = log.recent();
        assert_eq!(recent.first().unwrap().text, "message 19");
        assert_eq!(recent.last().unwrap().text, "message 6");
    }

    #[test]
    fn test_clones_share_storage() {
        let log = MessageLog::new();
        let handle = log.clone();
        handle.error("Could not retrieve status from API: NetworkTimeout", None);

        assert_eq!(log.len(), 1);
        assert!(log.latest().unwrap().text.ends_with("NetworkTimeout"));
    }

    #[test]
    fn test_empty_log() {
        let log = MessageLog::with_capacity(0);
        assert!(log.is_empty());
        assert!(log.latest().is_none());
        assert_eq!(log.capacity(), 1);
    }
}
