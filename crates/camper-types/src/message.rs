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

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a diagnostic message shown in the status bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    #[default]
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Timestamped diagnostic entry surfaced to the user instead of crashing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub stamp: DateTime<Local>,
    pub severity: Severity,
    pub text: String,
    #[serde(default)]
    pub details: Option<String>,
}

impl Message {
    pub fn new(severity: Severity, text: impl Into<String>, details: Option<String>) -> Self {
        Self {
            stamp: Local::now(),
            severity,
            text: text.into(),
            details,
        }
    }
}
