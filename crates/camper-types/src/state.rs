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

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::sensor::EntityId;

/// State value exactly as reported by the API, normalised to text.
///
/// The API sends numeric readings (`12500`), categorical states (`"ON"`) and
/// occasionally booleans; all of them end up here as a string so that the
/// display layer decides how to interpret them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RawState(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum WireState {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl<'de> Deserialize<'de> for RawState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match WireState::deserialize(deserializer)? {
            WireState::Text(text) => Self(text),
            WireState::Number(number) => Self(number.to_string()),
            WireState::Flag(flag) => Self(flag.to_string()),
        })
    }
}

impl RawState {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric coercion; `None` for categorical values and non-finite numbers
    pub fn as_number(&self) -> Option<f64> {
        self.0
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }
}

impl fmt::Display for RawState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RawState {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for RawState {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Last known value of a cached entity.
///
/// `Unknown` means "no valid data" (before the first fetch, after a failed
/// fetch, or while the owning view is hidden). It is never equal to a real
/// reading such as `"0"` or `"OFF"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EntityValue {
    #[default]
    Unknown,
    Known(RawState),
}

impl EntityValue {
    pub fn known(value: impl Into<RawState>) -> Self {
        Self::Known(value.into())
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn raw(&self) -> Option<&RawState> {
        match self {
            Self::Known(raw) => Some(raw),
            Self::Unknown => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        self.raw().and_then(RawState::as_number)
    }

    /// True when the value is known and textually equal to `state`
    pub fn is(&self, state: &str) -> bool {
        self.raw().is_some_and(|raw| raw.as_str() == state)
    }
}

impl fmt::Display for EntityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(raw) => write!(f, "{raw}"),
            Self::Unknown => f.write_str("Unknown"),
        }
    }
}

/// Latest state of one entity as returned by `GET /sensors/{id}/states`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateReading {
    pub entity_id: EntityId,
    pub state: RawState,
}

/// Immutable historical sample as returned by `GET /entities/{id}/states`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSample {
    #[serde(default)]
    pub id: Option<i64>,
    pub entity_id: EntityId,
    pub state: RawState,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created: DateTime<Utc>,
}

/// Parse an API timestamp.
///
/// Accepts RFC 3339 and naive ISO 8601 (`2024-06-01T10:00:00.123456`, also
/// with a space separator). Naive timestamps are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}
