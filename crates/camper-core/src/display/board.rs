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

use camper_types::{Message, Severity};

use super::Color;
use crate::messages::MAX_MESSAGES;

const STATUS_STAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
const BOARD_STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Green,
        Severity::Warning => Color::Orange,
        Severity::Error => Color::Red,
    }
}

/// Single-line summary of the latest message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub color: Color,
}

impl StatusLine {
    pub fn from_latest(latest: Option<&Message>) -> Self {
        match latest {
            Some(message) => Self {
                text: format!(
                    "{}: {}",
                    message.stamp.format(STATUS_STAMP_FORMAT),
                    message.text
                ),
                color: severity_color(message.severity),
            },
            None => Self {
                text: "No messages".to_owned(),
                color: Color::Gray,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRow {
    pub stamp: String,
    pub text: String,
    pub color: Color,
}

impl BoardRow {
    fn empty() -> Self {
        Self {
            stamp: String::new(),
            text: String::new(),
            color: Color::Transparent,
        }
    }
}

/// Fixed-size message table, newest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBoard {
    pub rows: Vec<BoardRow>,
}

impl MessageBoard {
    /// Lay out `messages` (newest first) into [`MAX_MESSAGES`] rows
    pub fn build(messages: &[Message]) -> Self {
        let mut rows: Vec<BoardRow> = messages
            .iter()
            .take(MAX_MESSAGES)
            .map(|m| BoardRow {
                stamp: m.stamp.format(BOARD_STAMP_FORMAT).to_string(),
                text: m.text.clone(),
                color: severity_color(m.severity),
            })
            .collect();
        rows.resize_with(MAX_MESSAGES, BoardRow::empty);

        if messages.is_empty()
            && let Some(first) = rows.first_mut()
        {
            first.text = "Currently there are no messages".to_owned();
        }

        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.stamp.is_empty())
    }
}

impl Default for MessageBoard {
    fn default() -> Self {
        Self::build(&[])
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::*;

    fn message(severity: Severity, text: &str) -> Message {
        Message {
            stamp: Local.with_ymd_and_hms(2025, 7, 14, 9, 30, 5).unwrap(),
            severity,
            text: text.to_owned(),
            details: None,
        }
    }

    #[test]
    fn test_status_line_formats_latest() {
        let latest = message(Severity::Warning, "Water low");
        let line = StatusLine::from_latest(Some(&latest));
        assert_eq!(line.text, "2025-07-14 09:30: Water low");
        assert_eq!(line.color, Color::Orange);
    }

    #[test]
    fn test_status_line_without_messages() {
        let line = StatusLine::from_latest(None);
        assert_eq!(line.text, "No messages");
        assert_eq!(line.color, Color::Gray);
    }

    #[test]
    fn test_empty_board() {
        let board = MessageBoard::default();
        assert_eq!(board.rows.len(), MAX_MESSAGES);
        assert_eq!(board.rows[0].text, "Currently there are no messages");
        assert_eq!(board.rows[0].color, Color::Transparent);
        assert!(board.is_empty());
    }

    #[test]
    fn test_board_rows_follow_severity() {
        let board = MessageBoard::build(&[
            message(Severity::Error, "Could not retrieve status from API: NetworkTimeout"),
            message(Severity::Info, "Connected"),
        ]);

        assert_eq!(board.rows.len(), MAX_MESSAGES);
        assert_eq!(board.rows[0].stamp, "2025-07-14 09:30:05");
        assert_eq!(board.rows[0].color, Color::Red);
        assert_eq!(board.rows[1].color, Color::Green);
        assert_eq!(board.rows[2], BoardRow::empty());
    }
}
