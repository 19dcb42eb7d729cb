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

//! Display State Mapper.
//!
//! Pure, total functions from cached raw values to a finite set of
//! presentation states. Unknown always maps to [`Presentation::Neutral`].

mod board;
mod panels;

use camper_types::EntityValue;
use serde::{Deserialize, Serialize};

pub use board::{BoardRow, MessageBoard, StatusLine, severity_color};
pub use panels::{CamperPanel, ClimatePanel, Gauge, Indicator, PowerPanel, Readout};

/// Battery voltage above which a battery is considered healthy
pub const DEFAULT_BATTERY_OK_VOLTS: f64 = 12.0;

/// Mains voltage above which shore power is considered connected
pub const DEFAULT_MAINS_PRESENT_VOLTS: f64 = 7.0;

const _: () = assert!(DEFAULT_MAINS_PRESENT_VOLTS > 0.0);
const _: () = assert!(DEFAULT_MAINS_PRESENT_VOLTS < DEFAULT_BATTERY_OK_VOLTS);

/// Named colors understood by every renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Gray,
    Green,
    DarkRed,
    Red,
    Orange,
    White,
    Transparent,
}

impl Color {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gray => "gray",
            Self::Green => "green",
            Self::DarkRed => "darkred",
            Self::Red => "red",
            Self::Orange => "orange",
            Self::White => "white",
            Self::Transparent => "transparent",
        }
    }
}

/// Discrete presentation state of a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Presentation {
    /// No valid data
    Neutral,
    Positive,
    Negative,
    /// Transitional state of a write-backed entity
    Caution,
    /// Known reading without a threshold
    Plain,
}

impl Presentation {
    pub fn color(self) -> Color {
        match self {
            Self::Neutral => Color::Gray,
            Self::Positive => Color::Green,
            Self::Negative => Color::DarkRed,
            Self::Caution => Color::Orange,
            Self::Plain => Color::White,
        }
    }
}

/// Divisor turning a raw integer reading into display units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    divisor: f64,
}

impl Scale {
    pub const UNIT: Self = Self::new(1.0);
    /// Raw milli-units, e.g. millivolts to volts
    pub const MILLI: Self = Self::new(1000.0);
    /// Raw 0-100 to a 0-1 fraction
    pub const PERCENT: Self = Self::new(100.0);

    pub const fn new(divisor: f64) -> Self {
        Self { divisor }
    }

    pub fn apply(self, raw: f64) -> f64 {
        raw / self.divisor
    }

    /// Numeric value of `value` in display units
    pub fn value_of(self, value: &EntityValue) -> Option<f64> {
        value.as_number().map(|raw| self.apply(raw))
    }
}

/// Thresholds for continuous readings, in display units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayThresholds {
    #[serde(default = "default_battery_ok_volts")]
    pub battery_ok_volts: f64,

    #[serde(default = "default_mains_present_volts")]
    pub mains_present_volts: f64,
}

fn default_battery_ok_volts() -> f64 {
    DEFAULT_BATTERY_OK_VOLTS
}

fn default_mains_present_volts() -> f64 {
    DEFAULT_MAINS_PRESENT_VOLTS
}

impl Default for DisplayThresholds {
    fn default() -> Self {
        Self {
            battery_ok_volts: default_battery_ok_volts(),
            mains_present_volts: default_mains_present_volts(),
        }
    }
}

/// Presentation of an ON/OFF/PENDING switch
pub fn switch_presentation(value: &EntityValue) -> Presentation {
    match value.raw().map(|raw| raw.as_str()) {
        Some("ON") => Presentation::Positive,
        Some("OFF") => Presentation::Negative,
        Some("PENDING") => Presentation::Caution,
        Some(_) | None => Presentation::Neutral,
    }
}

/// Label suffix shown next to a switch, `Unknown` for anything unrecognised
pub fn switch_label(value: &EntityValue) -> &'static str {
    match switch_presentation(value) {
        Presentation::Positive => "ON",
        Presentation::Negative => "OFF",
        Presentation::Caution => "PENDING",
        Presentation::Neutral | Presentation::Plain => "Unknown",
    }
}

/// Positive when the scaled value is strictly above `threshold`
pub fn threshold_presentation(value: &EntityValue, scale: Scale, threshold: f64) -> Presentation {
    match scale.value_of(value) {
        Some(v) if v > threshold => Presentation::Positive,
        Some(_) => Presentation::Negative,
        None => Presentation::Neutral,
    }
}

/// Fill level in `[0, 1]`, `None` when there is no numeric reading
pub fn level_fraction(value: &EntityValue, scale: Scale) -> Option<f64> {
    scale.value_of(value).map(|v| v.clamp(0.0, 1.0))
}

/// Plain when known, Neutral otherwise
pub fn reading_presentation(value: &EntityValue) -> Presentation {
    if value.is_unknown() {
        Presentation::Neutral
    } else {
        Presentation::Plain
    }
}

/// Text of a reading in display units; empty when Unknown
pub fn reading_text(value: &EntityValue, scale: Scale) -> String {
    match (value.raw(), scale.value_of(value)) {
        (_, Some(v)) => format_number(v),
        (Some(raw), None) => raw.as_str().to_owned(),
        (None, None) => String::new(),
    }
}

/// Shortest decimal form, keeping one decimal for whole numbers (`12.0`, `12.5`)
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
