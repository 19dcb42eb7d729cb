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

use std::sync::Arc;

use async_trait::async_trait;
use camper_core::{TelemetryResult, TelemetrySource};
use camper_types::{Entity, EntityId, RawState, Sensor, SensorId, StateReading, StateSample};

use crate::client::TelemetryClient;

/// HTTP adapter implementing [`TelemetrySource`]
#[derive(Debug, Clone)]
pub struct HttpTelemetrySource {
    client: Arc<TelemetryClient>,
    name: String,
}

impl HttpTelemetrySource {
    pub fn new(client: Arc<TelemetryClient>) -> Self {
        let name = format!("telemetry API at {}", client.base_url());
        Self { client, name }
    }

    pub fn client(&self) -> &Arc<TelemetryClient> {
        &self.client
    }
}

#[async_trait]
impl TelemetrySource for HttpTelemetrySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_sensors(&self) -> TelemetryResult<Vec<Sensor>> {
        Ok(self.client.list_sensors().await?)
    }

    async fn sensor_entities(&self, sensor_id: SensorId) -> TelemetryResult<Vec<Entity>> {
        Ok(self.client.sensor_entities(sensor_id).await?)
    }

    async fn sensor_states(&self, sensor_id: SensorId) -> TelemetryResult<Vec<StateReading>> {
        Ok(self.client.sensor_states(sensor_id).await?)
    }

    async fn entity_history(
        &self,
        entity_id: EntityId,
        limit: usize,
    ) -> TelemetryResult<Vec<StateSample>> {
        Ok(self.client.entity_states(entity_id, limit).await?)
    }

    async fn set_state(
        &self,
        entity_id: EntityId,
        desired: &RawState,
    ) -> TelemetryResult<RawState> {
        Ok(self.client.post_action(entity_id, desired).await?)
    }
}
