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

mod config;
mod dashboard;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use camper_api::{HttpTelemetrySource, TelemetryClient};
use camper_core::TelemetrySource;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::AppConfig;
use crate::dashboard::{Switch, Tab};

/// Camper van telemetry dashboard
#[derive(Debug, Parser)]
#[command(name = "camper-dash", version, about)]
struct Cli {
    /// Configuration file [default: ./camper.toml when present]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Telemetry API base URL, overrides configuration and environment
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Live dashboard driven by commands on stdin (default)
    Run {
        /// View shown at startup
        #[arg(long, value_enum, default_value_t = Tab::Status)]
        tab: Tab,

        /// History entity selected at startup, e.g. camper_water_state
        #[arg(long)]
        select: Option<String>,
    },
    /// Refresh every status panel once and print it
    Status,
    /// List sensors and their chartable entities
    Sensors,
    /// Print the history chart of one entity
    History {
        key: String,

        /// Samples to request [default: history.limit]
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Request a state for a camper switch
    Set {
        #[arg(value_enum)]
        switch: Switch,
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, origin) = config::AppConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.api_base {
        config.api.base_url = base_url;
        config.validate()?;
    }

    // RUST_LOG wins over the configured level
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.system.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    info!("🚐 Starting camper-dash {}", env!("CARGO_PKG_VERSION"));
    log_config_summary(&config, &origin);

    let client = TelemetryClient::new(config.api.base_url.clone(), config.timeout())
        .context("Failed to create telemetry client")?
        .with_retry_config(config.api.max_retries, config.retry_delay());
    let source: Arc<dyn TelemetrySource> = Arc::new(HttpTelemetrySource::new(Arc::new(client)));

    let command = cli.command.unwrap_or(Command::Run {
        tab: Tab::Status,
        select: None,
    });
    match command {
        Command::Run { tab, select } => dashboard::run(source, &config, tab.into(), select).await,
        Command::Status => dashboard::print_status(source.as_ref(), &config).await,
        Command::Sensors => dashboard::print_sensors(source.as_ref()).await,
        Command::History { key, limit } => {
            dashboard::print_history(source.as_ref(), &config, &key, limit).await
        }
        Command::Set { switch, value } => {
            dashboard::set_switch(source.as_ref(), switch, &value).await
        }
    }
}

fn log_config_summary(config: &AppConfig, origin: &config::ConfigOrigin) {
    info!("📋 Configuration Summary ({origin}):");
    info!("   API: {}", config.api.base_url);
    info!(
        "   Timeout: {}s, attempts: {}",
        config.api.timeout_secs, config.api.max_retries
    );
    info!(
        "   Polling: status {}s, history {}s, messages {}s",
        config.polling.status_interval_secs,
        config.polling.history_interval_secs,
        config.polling.messages_interval_secs
    );
    info!(
        "   History: {} samples in {}h buckets",
        config.history.limit, config.history.bucket_hours
    );
    info!(
        "   Thresholds: battery {}V, mains {}V",
        config.display.battery_ok_volts, config.display.mains_present_volts
    );
}
