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
use std::time::Duration;

use chrono::TimeDelta;
use tracing::{debug, warn};

use super::{Job, View, ViewId};
use crate::catalog::SensorCatalog;
use crate::errors::{TelemetryError, TelemetryResult};
use crate::messages::MessageLog;
use crate::series::{ChartPlan, DEFAULT_BUCKET_HOURS, plan_chart};
use crate::traits::TelemetrySource;

/// Default number of samples requested per chart
pub const DEFAULT_HISTORY_LIMIT: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistorySettings {
    pub limit: usize,
    pub bucket: TimeDelta,
    pub interval: Duration,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
            bucket: TimeDelta::hours(DEFAULT_BUCKET_HOURS),
            interval: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryCommand {
    /// Chart the entity with this `"{sensor}_{entity}"` key, or nothing
    Select(Option<String>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFrame {
    pub selection: Option<String>,
    pub unit: Option<String>,
    /// Keys that can be selected
    pub available: Vec<String>,
    pub plan: ChartPlan,
}

#[derive(Debug)]
enum HistoryFailure {
    Catalog(TelemetryError),
    Entity(TelemetryError),
}

#[derive(Debug)]
pub struct HistoryUpdate {
    catalog: Option<SensorCatalog>,
    selection: Option<String>,
    result: Result<ChartPlan, HistoryFailure>,
}

/// Fetch the history of the chartable entity `key` and plan its chart
pub async fn load_chart(
    source: &dyn TelemetrySource,
    catalog: &SensorCatalog,
    key: &str,
    limit: usize,
    bucket: TimeDelta,
) -> TelemetryResult<ChartPlan> {
    let entity = catalog
        .chartable_entity(key)
        .ok_or_else(|| {
            TelemetryError::contract(format!("No entity `{key}` in API sensor list."))
        })?;

    let samples = source.entity_history(entity.entity_id, limit).await?;
    debug!("Fetched {} samples for {key}", samples.len());
    Ok(plan_chart(&samples, bucket))
}

/// Time-series chart of one selected entity
pub struct HistoryView {
    source: Arc<dyn TelemetrySource>,
    log: MessageLog,
    settings: HistorySettings,
    catalog: Option<SensorCatalog>,
    selection: Option<String>,
    plan: ChartPlan,
}

impl HistoryView {
    pub fn new(
        source: Arc<dyn TelemetrySource>,
        log: MessageLog,
        settings: HistorySettings,
    ) -> Self {
        Self {
            source,
            log,
            settings,
            catalog: None,
            selection: None,
            plan: ChartPlan::Empty,
        }
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    fn chart_job(&self) -> Job<HistoryUpdate> {
        let source = Arc::clone(&self.source);
        let catalog = self.catalog.clone();
        let selection = self.selection.clone();
        let settings = self.settings;

        Box::pin(async move {
            let (catalog, fresh) = match catalog {
                Some(catalog) => (catalog, false),
                None => match SensorCatalog::load(source.as_ref()).await {
                    Ok(catalog) => (catalog, true),
                    Err(err) => {
                        return HistoryUpdate {
                            catalog: None,
                            selection,
                            result: Err(HistoryFailure::Catalog(err)),
                        };
                    }
                },
            };

            let result = match selection.as_deref() {
                Some(key) => {
                    load_chart(source.as_ref(), &catalog, key, settings.limit, settings.bucket)
                        .await
                        .map_err(HistoryFailure::Entity)
                }
                None => Ok(ChartPlan::Empty),
            };

            HistoryUpdate {
                catalog: fresh.then_some(catalog),
                selection,
                result,
            }
        })
    }
}

impl fmt::Debug for HistoryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryView")
            .field("source", &self.source.name())
            .field("settings", &self.settings)
            .field("selection", &self.selection)
            .field("plan", &self.plan)
            .finish_non_exhaustive()
    }
}

impl View for HistoryView {
    type Update = HistoryUpdate;
    type Command = HistoryCommand;
    type Frame = HistoryFrame;

    fn name(&self) -> &'static str {
        "history"
    }

    fn id(&self) -> ViewId {
        ViewId::History
    }

    fn poll_interval(&self) -> Duration {
        self.settings.interval
    }

    fn start_refresh(&mut self) -> Job<Self::Update> {
        self.chart_job()
    }

    fn start_command(&mut self, command: Self::Command) -> Option<Job<Self::Update>> {
        match command {
            HistoryCommand::Select(selection) => {
                self.selection = selection.filter(|key| !key.trim().is_empty());
                self.plan = ChartPlan::Empty;
                Some(self.chart_job())
            }
        }
    }

    fn apply(&mut self, update: Self::Update) {
        if let Some(catalog) = update.catalog {
            self.catalog = Some(catalog);
        }
        if update.selection != self.selection {
            debug!("Selection changed while fetching, dropping chart");
            return;
        }

        match update.result {
            Ok(plan) => self.plan = plan,
            Err(failure) => {
                self.plan = ChartPlan::Empty;
                let (prefix, err) = match failure {
                    HistoryFailure::Catalog(err) => ("Could not communicate with API", err),
                    HistoryFailure::Entity(err) => {
                        if err.is_contract_violation() {
                            self.catalog = None;
                        }
                        ("Could not retrieve entity data from API", err)
                    }
                };
                warn!("❌ [API ERROR] {prefix}: {err}");
                self.log
                    .error(format!("{prefix}: {}", err.kind_name()), Some(err.to_string()));
            }
        }
    }

    fn deactivate(&mut self) {
        self.plan = ChartPlan::Empty;
    }

    fn frame(&self) -> Self::Frame {
        let chartable = self
            .catalog
            .as_ref()
            .map(SensorCatalog::chartable)
            .unwrap_or_default();
        let unit = self.selection.as_deref().and_then(|key| {
            chartable
                .iter()
                .find(|c| c.key == key)
                .and_then(|c| c.unit.clone())
        });

        HistoryFrame {
            selection: self.selection.clone(),
            unit,
            available: chartable.into_iter().map(|c| c.key).collect(),
            plan: self.plan.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use camper_types::{EntityId, RawState, StateSample};
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::testing::{FakeSource, camper_catalog};

    fn source_with_history() -> FakeSource {
        let source = FakeSource::new(camper_catalog().sensors().to_vec());
        let samples = (0..6)
            .map(|hour| StateSample {
                id: Some(i64::from(hour)),
                entity_id: EntityId(16),
                state: RawState::new(format!("{}", 12_000 + hour * 100)),
                created: Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap(),
            })
            .collect();
        source.set_history(EntityId(16), samples);
        source
    }

    fn history_view(source: &FakeSource, log: &MessageLog) -> HistoryView {
        HistoryView::new(
            Arc::new(source.clone()),
            log.clone(),
            HistorySettings::default(),
        )
    }

    async fn run_refresh(view: &mut HistoryView) {
        let job = view.start_refresh();
        view.apply(job.await);
    }

    async fn run_command(view: &mut HistoryView, command: HistoryCommand) {
        let job = view.start_command(command).unwrap();
        view.apply(job.await);
    }

    #[tokio::test]
    async fn test_without_selection_plan_is_empty() {
        let source = source_with_history();
        let mut view = history_view(&source, &MessageLog::new());

        run_refresh(&mut view).await;
        run_refresh(&mut view).await;

        let frame = view.frame();
        assert_eq!(frame.plan, ChartPlan::Empty);
        assert!(frame.available.contains(&"camper_household_voltage".to_owned()));
        assert_eq!(source.calls().list_sensors, 1);
        assert_eq!(source.calls().entity_history, 0);
    }

    #[tokio::test]
    async fn test_select_numeric_entity_produces_bands() {
        let source = source_with_history();
        let mut view = history_view(&source, &MessageLog::new());

        run_command(
            &mut view,
            HistoryCommand::Select(Some("camper_household_voltage".to_owned())),
        )
        .await;

        let frame = view.frame();
        assert_eq!(frame.unit.as_deref(), Some("mV"));
        let ChartPlan::Bands(bands) = frame.plan else {
            panic!("expected bands, got {:?}", frame.plan);
        };
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].count, 4);
        assert_eq!(bands[0].min, 12_000.0);
        assert_eq!(bands[0].max, 12_300.0);
        assert_eq!(bands[1].count, 2);
    }

    #[tokio::test]
    async fn test_unknown_selection_logs_contract_violation() {
        let log = MessageLog::new();
        let mut view = history_view(&source_with_history(), &log);

        run_command(&mut view, HistoryCommand::Select(Some("garage_door".to_owned()))).await;

        assert_eq!(view.frame().plan, ChartPlan::Empty);
        assert_eq!(
            log.latest().unwrap().text,
            "Could not retrieve entity data from API: ApiContractViolation"
        );
    }

    #[tokio::test]
    async fn test_catalog_failure_is_reported() {
        let source = source_with_history();
        source.fail_with(TelemetryError::NetworkTimeout("3s".to_owned()));
        let log = MessageLog::new();
        let mut view = history_view(&source, &log);

        run_refresh(&mut view).await;

        assert!(view.frame().available.is_empty());
        assert_eq!(
            log.latest().unwrap().text,
            "Could not communicate with API: NetworkTimeout"
        );

        source.recover();
        run_refresh(&mut view).await;
        assert!(!view.frame().available.is_empty());
    }

    #[tokio::test]
    async fn test_deactivate_clears_chart_but_keeps_selection() {
        let mut view = history_view(&source_with_history(), &MessageLog::new());
        run_command(
            &mut view,
            HistoryCommand::Select(Some("camper_household_voltage".to_owned())),
        )
        .await;

        view.deactivate();

        let frame = view.frame();
        assert_eq!(frame.plan, ChartPlan::Empty);
        assert_eq!(frame.selection.as_deref(), Some("camper_household_voltage"));
    }

    #[tokio::test]
    async fn test_select_none_clears() {
        let source = source_with_history();
        let mut view = history_view(&source, &MessageLog::new());
        run_command(
            &mut view,
            HistoryCommand::Select(Some("camper_household_voltage".to_owned())),
        )
        .await;

        run_command(&mut view, HistoryCommand::Select(None)).await;

        assert_eq!(view.selection(), None);
        assert_eq!(view.frame().plan, ChartPlan::Empty);
        assert_eq!(source.calls().entity_history, 1);
    }
}
