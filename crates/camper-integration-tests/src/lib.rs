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


//! End-to-end tests of the dashboard core against a mocked telemetry API.
//!
//! The fixtures here describe a typical van: one `camper` board, a
//! SmartShunt battery monitor, a SmartSolar charger and two climate sensors.

use std::sync::Arc;
use std::time::Duration;

use camper_api::{HttpTelemetrySource, TelemetryClient};
use camper_core::TelemetrySource;
use mockito::{Mock, ServerGuard};
use serde_json::{Value, json};

fn entity(id: i64, name: &str, unit: Option<&str>, sensor_id: i64) -> Value {
    json!({"id": id, "name": name, "unit": unit, "sensor_id": sensor_id})
}

/// Body of `GET /sensors` with every entity inlined
pub fn sensors_json() -> Value {
    json!([
        {
            "id": 1,
            "name": "camper",
            "entities": [
                entity(10, "household_state", None, 1),
                entity(11, "pump_state", None, 1),
                entity(12, "water_state", Some("%"), 1),
                entity(13, "waste_state", Some("%"), 1),
                entity(14, "mains_voltage", Some("mV"), 1),
                entity(15, "starter_voltage", Some("mV"), 1),
                entity(16, "household_voltage", Some("mV"), 1),
            ]
        },
        {
            "id": 2,
            "name": "SmartShunt",
            "entities": [
                entity(20, "soc", Some("%"), 2),
                entity(21, "remaining_mins", Some("min"), 2),
                entity(22, "consumed_ah", Some("Ah"), 2),
            ]
        },
        {
            "id": 3,
            "name": "SmartSolar",
            "entities": [
                entity(30, "solar_power", Some("W"), 3),
                entity(31, "yield_today", Some("kWh"), 3),
                entity(32, "charge_state", None, 3),
            ]
        },
        {
            "id": 4,
            "name": "outside",
            "entities": [
                entity(40, "temperature", Some("°C"), 4),
                entity(41, "humidity", Some("%"), 4),
            ]
        },
        {
            "id": 5,
            "name": "inside",
            "entities": [
                entity(50, "temperature", Some("°C"), 5),
                entity(51, "humidity", Some("%"), 5),
            ]
        }
    ])
}

pub async fn mock_json(server: &mut ServerGuard, method: &str, path: &str, body: &Value) -> Mock {
    server
        .mock(method, path)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

pub async fn mock_sensors(server: &mut ServerGuard) -> Mock {
    mock_json(server, "GET", "/sensors", &sensors_json()).await
}

/// Typical camper board readings: household on, pump off, mains connected
pub async fn mock_camper_states(server: &mut ServerGuard) -> Mock {
    let body = json!([
        {"entity_id": 10, "state": "ON"},
        {"entity_id": 11, "state": "OFF"},
        {"entity_id": 12, "state": 55},
        {"entity_id": 13, "state": "20"},
        {"entity_id": 14, "state": 230000},
        {"entity_id": 15, "state": 12600},
        {"entity_id": 16, "state": 11800}
    ]);
    mock_json(server, "GET", "/sensors/1/states", &body).await
}

pub fn source_for(base_url: impl Into<String>) -> Arc<dyn TelemetrySource> {
    let client = TelemetryClient::new(base_url, Duration::from_secs(2))
        .expect("valid base url")
        .with_retry_config(1, Duration::from_millis(10));
    Arc::new(HttpTelemetrySource::new(Arc::new(client)))
}

pub fn source(server: &ServerGuard) -> Arc<dyn TelemetrySource> {
    source_for(server.url())
}

/// Base URL of a port nothing listens on
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// A listener that accepts connections but never answers, with its base URL.
///
/// Keep the listener alive for as long as requests should hang.
pub fn silent_server() -> (std::net::TcpListener, String) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    (listener, format!("http://127.0.0.1:{port}"))
}
