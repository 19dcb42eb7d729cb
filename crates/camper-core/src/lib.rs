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

//! Polling, caching and presentation core of the camper dashboard.
//!
//! Everything here is independent of the HTTP transport: data flows in
//! through [`TelemetrySource`] and out as cache snapshots, display panels
//! and chart plans.

pub mod cache;
pub mod catalog;
pub mod display;
pub mod entities;
pub mod errors;
pub mod messages;
pub mod series;
pub mod traits;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{
    ActionOutcome, EntityStateCache, RefreshOutcome, RefreshResult, Snapshot, fetch_action,
    fetch_refresh,
};
pub use catalog::{Bindings, ChartableEntity, SensorCatalog};
pub use display::{
    CamperPanel, ClimatePanel, Color, DisplayThresholds, Gauge, Indicator, MessageBoard,
    PowerPanel, Presentation, Readout, Scale, StatusLine,
};
pub use entities::{CamperEntity, ClimateEntity, EntitySet, PowerEntity};
pub use errors::{TelemetryError, TelemetryResult};
pub use messages::{MAX_MESSAGES, MessageLog};
pub use series::{Band, ChartPlan, MarkerTrack, Series, classify, plan_chart, resample};
pub use traits::TelemetrySource;
pub use views::{
    HistoryCommand, HistoryFrame, HistorySettings, HistoryView, MessagesView, PanelCommand,
    PanelView, View, ViewHandle, ViewId, ViewSwitcher, spawn_view,
};
