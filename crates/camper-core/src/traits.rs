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

use async_trait::async_trait;
use camper_types::{Entity, EntityId, RawState, Sensor, SensorId, StateReading, StateSample};

use crate::errors::TelemetryResult;

/// Source of sensor metadata and entity states.
///
/// Implemented over HTTP by `camper-api`; every call is expected to be bounded
/// by a timeout and to classify failures into [`TelemetryError`](crate::TelemetryError).
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Human-readable name for logs
    fn name(&self) -> &str;

    /// `GET /sensors` - all sensors, usually with their entities
    async fn list_sensors(&self) -> TelemetryResult<Vec<Sensor>>;

    /// `GET /sensors/{id}/entities`
    async fn sensor_entities(&self, sensor_id: SensorId) -> TelemetryResult<Vec<Entity>>;

    /// `GET /sensors/{id}/states` - latest state per entity
    async fn sensor_states(&self, sensor_id: SensorId) -> TelemetryResult<Vec<StateReading>>;

    /// `GET /entities/{id}/states?limit=N` - time-ordered history
    async fn entity_history(
        &self,
        entity_id: EntityId,
        limit: usize,
    ) -> TelemetryResult<Vec<StateSample>>;

    /// `POST /action/{entity_id}` - request a state, returns the state the server adopted
    async fn set_state(&self, entity_id: EntityId, desired: &RawState) -> TelemetryResult<RawState>;
}
