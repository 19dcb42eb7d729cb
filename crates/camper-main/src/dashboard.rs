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

//! Interactive dashboard loop and one-shot commands.

use std::sync::Arc;

use anyhow::Result;
use camper_core::views::load_chart;
use camper_core::{
    CamperEntity, CamperPanel, ClimateEntity, ClimatePanel, DisplayThresholds, EntitySet,
    EntityStateCache,
    HistoryCommand, HistoryFrame, HistoryView, MessageBoard, MessageLog, MessagesView,
    PanelCommand, PanelView, PowerEntity, PowerPanel, SensorCatalog, StatusLine,
    TelemetrySource, ViewHandle, ViewId, ViewSwitcher, spawn_view,
};
use camper_types::RawState;
use clap::ValueEnum;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Tab {
    Status,
    History,
    Messages,
}

impl From<Tab> for ViewId {
    fn from(tab: Tab) -> Self {
        match tab {
            Tab::Status => Self::Status,
            Tab::History => Self::History,
            Tab::Messages => Self::Messages,
        }
    }
}

/// Writable camper switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    Household,
    Pump,
}

impl From<Switch> for CamperEntity {
    fn from(switch: Switch) -> Self {
        match switch {
            Switch::Household => Self::HouseholdState,
            Switch::Pump => Self::PumpState,
        }
    }
}

/// One line typed on stdin while the dashboard runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardCommand {
    Tab(ViewId),
    Toggle(CamperEntity),
    Set(CamperEntity, String),
    Select(Option<String>),
    Help,
    Quit,
}

/// Parse a stdin command; `Ok(None)` for a blank line
pub fn parse_command(line: &str) -> Result<Option<DashboardCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let switch = |name: &str| Switch::from_str(name, true).map(CamperEntity::from);

    let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("tab", [name]) => DashboardCommand::Tab(Tab::from_str(name, true)?.into()),
        ("toggle", [name]) => DashboardCommand::Toggle(switch(name)?),
        ("set", [name, state]) => DashboardCommand::Set(switch(name)?, (*state).to_owned()),
        ("select", ["none"]) => DashboardCommand::Select(None),
        ("select", [key]) => DashboardCommand::Select(Some((*key).to_owned())),
        ("help" | "?", []) => DashboardCommand::Help,
        ("quit" | "exit" | "q", []) => DashboardCommand::Quit,
        _ => return Err(format!("Unknown command '{}'; type 'help'", line.trim())),
    };
    Ok(Some(command))
}

struct Views {
    camper: ViewHandle<PanelView<CamperEntity>>,
    power: ViewHandle<PanelView<PowerEntity>>,
    climate: ViewHandle<PanelView<ClimateEntity>>,
    history: ViewHandle<HistoryView>,
    messages: ViewHandle<MessagesView>,
}

impl Views {
    fn spawn(
        source: &Arc<dyn TelemetrySource>,
        config: &AppConfig,
        log: &MessageLog,
        switcher: &ViewSwitcher,
        cancel: &CancellationToken,
    ) -> Self {
        let status_every = config.status_interval();
        Self {
            camper: spawn_view(
                PanelView::new(Arc::clone(source), log.clone(), status_every),
                switcher.subscribe(),
                cancel.child_token(),
            ),
            power: spawn_view(
                PanelView::new(Arc::clone(source), log.clone(), status_every),
                switcher.subscribe(),
                cancel.child_token(),
            ),
            climate: spawn_view(
                PanelView::new(Arc::clone(source), log.clone(), status_every),
                switcher.subscribe(),
                cancel.child_token(),
            ),
            history: spawn_view(
                HistoryView::new(Arc::clone(source), log.clone(), config.history_settings()),
                switcher.subscribe(),
                cancel.child_token(),
            ),
            messages: spawn_view(
                MessagesView::new(log.clone(), config.messages_interval()),
                switcher.subscribe(),
                cancel.child_token(),
            ),
        }
    }

    async fn join(self) {
        let tasks = [
            ("camper", self.camper.task),
            ("power", self.power.task),
            ("climate", self.climate.task),
            ("history", self.history.task),
            ("messages", self.messages.task),
        ];
        for (name, task) in tasks {
            if let Err(e) = task.await {
                warn!("View {name} ended abnormally: {e}");
            }
        }
    }
}

/// Apply one command; `false` when the dashboard should exit
async fn dispatch(command: DashboardCommand, switcher: &ViewSwitcher, views: &Views) -> bool {
    match command {
        DashboardCommand::Tab(view) => {
            if !switcher.switch_to(view) {
                println!("Already on {view}");
            }
        }
        DashboardCommand::Toggle(key) => {
            if require_status(switcher) {
                views.camper.send(PanelCommand::Toggle(key)).await;
            }
        }
        DashboardCommand::Set(key, state) => {
            if require_status(switcher) {
                views
                    .camper
                    .send(PanelCommand::Set(key, RawState::new(state)))
                    .await;
            }
        }
        DashboardCommand::Select(selection) => {
            if !views.history.send(HistoryCommand::Select(selection)).await {
                warn!("History view is not running");
            }
        }
        DashboardCommand::Help => println!("{}", render::help()),
        DashboardCommand::Quit => return false,
    }
    true
}

fn require_status(switcher: &ViewSwitcher) -> bool {
    let on_status = switcher.active() == ViewId::Status;
    if !on_status {
        println!("Switches are only available on the status tab");
    }
    on_status
}

fn print_status_line(log: &MessageLog, last: &mut Option<StatusLine>) {
    let line = StatusLine::from_latest(log.latest().as_ref());
    if last.as_ref() != Some(&line) {
        println!("{}", render::status_line(&line));
        *last = Some(line);
    }
}

/// Run the live dashboard until `quit`, end of input or Ctrl+C
pub async fn run(
    source: Arc<dyn TelemetrySource>,
    config: &AppConfig,
    initial: ViewId,
    selection: Option<String>,
) -> Result<()> {
    let log = MessageLog::new();
    let switcher = ViewSwitcher::new(initial);
    let cancel = CancellationToken::new();
    let mut views = Views::spawn(&source, config, &log, &switcher, &cancel);
    let thresholds = config.display;

    if selection.is_some() {
        views.history.send(HistoryCommand::Select(selection)).await;
    }

    info!("🚐 Dashboard running on the {initial} tab");
    println!("{}", render::help());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut last_status = None;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match parse_command(&line) {
                    Ok(Some(command)) => {
                        if !dispatch(command, &switcher, &views).await {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => println!("{e}"),
                },
                Ok(None) => {
                    debug!("stdin closed");
                    stdin_open = false;
                }
                Err(e) => {
                    warn!("Failed to read stdin: {e}");
                    stdin_open = false;
                }
            },
            Ok(()) = views.camper.frames.changed() => {
                let snapshot = views.camper.frames.borrow_and_update().clone();
                let panel = CamperPanel::build(&snapshot, &thresholds);
                println!("{}", render::camper(&panel));
            }
            Ok(()) = views.power.frames.changed() => {
                let panel = PowerPanel::build(&views.power.frames.borrow_and_update());
                println!("{}", render::power(&panel));
            }
            Ok(()) = views.climate.frames.changed() => {
                let panel = ClimatePanel::build(&views.climate.frames.borrow_and_update());
                println!("{}", render::climate(&panel));
            }
            Ok(()) = views.history.frames.changed() => {
                let frame = views.history.frames.borrow_and_update().clone();
                println!("{}", render::history(&frame));
            }
            Ok(()) = views.messages.frames.changed() => {
                let board = views.messages.frames.borrow_and_update().clone();
                println!("{}", render::board(&board));
            }
        }
        print_status_line(&log, &mut last_status);
    }

    cancel.cancel();
    views.join().await;
    info!("👋 Dashboard stopped");
    Ok(())
}

fn print_messages(log: &MessageLog) {
    if !log.is_empty() {
        println!("{}", render::board(&MessageBoard::build(&log.recent())));
    }
}

async fn refreshed<K: EntitySet>(
    source: &dyn TelemetrySource,
    log: &MessageLog,
) -> EntityStateCache<K> {
    let mut cache = EntityStateCache::new(log.clone());
    cache.refresh(source).await;
    cache
}

/// Refresh every panel once and print it
pub async fn print_status(source: &dyn TelemetrySource, config: &AppConfig) -> Result<()> {
    let log = MessageLog::new();

    let camper = refreshed::<CamperEntity>(source, &log).await;
    let power = refreshed::<PowerEntity>(source, &log).await;
    let climate = refreshed::<ClimateEntity>(source, &log).await;

    let camper_panel = CamperPanel::build(&camper.snapshot(), &config.display);
    println!("{}", render::camper(&camper_panel));
    println!("{}", render::power(&PowerPanel::build(&power.snapshot())));
    println!("{}", render::climate(&ClimatePanel::build(&climate.snapshot())));
    print_messages(&log);
    Ok(())
}

pub async fn print_sensors(source: &dyn TelemetrySource) -> Result<()> {
    match SensorCatalog::load(source).await {
        Ok(catalog) => println!("{}", render::sensors(&catalog)),
        Err(e) => {
            let log = MessageLog::new();
            log.error(
                format!("Could not communicate with API: {}", e.kind_name()),
                Some(e.to_string()),
            );
            print_messages(&log);
        }
    }
    Ok(())
}

/// Load and print the chart plan for one entity key
pub async fn print_history(
    source: &dyn TelemetrySource,
    config: &AppConfig,
    key: &str,
    limit: Option<usize>,
) -> Result<()> {
    let log = MessageLog::new();
    let settings = config.history_settings();

    let catalog = match SensorCatalog::load(source).await {
        Ok(catalog) => catalog,
        Err(e) => {
            log.error(
                format!("Could not communicate with API: {}", e.kind_name()),
                Some(e.to_string()),
            );
            print_messages(&log);
            return Ok(());
        }
    };

    let available: Vec<String> = catalog.chartable().into_iter().map(|c| c.key).collect();
    let Some(entity) = catalog.chartable_entity(key) else {
        anyhow::bail!("Unknown entity '{key}'; available: {}", available.join(", "));
    };

    let limit = limit.unwrap_or(settings.limit);
    match load_chart(source, &catalog, key, limit, settings.bucket).await {
        Ok(plan) => {
            let frame = HistoryFrame {
                selection: Some(entity.key),
                unit: entity.unit,
                available,
                plan,
            };
            println!("{}", render::history(&frame));
        }
        Err(e) => {
            log.error(
                format!("Could not retrieve entity data from API: {}", e.kind_name()),
                Some(e.to_string()),
            );
        }
    }
    print_messages(&log);
    Ok(())
}

/// Request a state for one camper switch and print the echoed result
pub async fn set_switch(source: &dyn TelemetrySource, switch: Switch, state: &str) -> Result<()> {
    let log = MessageLog::new();
    let mut cache = EntityStateCache::<CamperEntity>::new(log.clone());
    let key = CamperEntity::from(switch);

    if let Ok(value) = cache.set_entity_state(source, key, state).await {
        info!(
            "✅ {} now {}",
            key.label(),
            value.raw().map_or("Unknown", RawState::as_str)
        );
    }

    let panel = CamperPanel::build(&cache.snapshot(), &DisplayThresholds::default());
    let indicator = match switch {
        Switch::Household => &panel.household,
        Switch::Pump => &panel.pump,
    };
    println!("{}", indicator.label);
    print_messages(&log);
    Ok(())
}
