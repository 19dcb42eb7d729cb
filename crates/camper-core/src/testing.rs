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

//! In-memory [`TelemetrySource`] used by unit tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use camper_types::{Entity, EntityId, RawState, Sensor, SensorId, StateReading, StateSample};
use parking_lot::Mutex;

use crate::catalog::SensorCatalog;
use crate::errors::{TelemetryError, TelemetryResult};
use crate::traits::TelemetrySource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calls {
    pub list_sensors: usize,
    pub sensor_entities: usize,
    pub sensor_states: usize,
    pub entity_history: usize,
    pub set_state: usize,
}

#[derive(Default)]
struct Inner {
    sensors: Vec<Sensor>,
    entities: HashMap<SensorId, Vec<Entity>>,
    states: HashMap<SensorId, Vec<StateReading>>,
    history: HashMap<EntityId, Vec<StateSample>>,
    failure: Option<TelemetryError>,
    sensor_failures: HashMap<SensorId, TelemetryError>,
    action_failure: Option<TelemetryError>,
    echo: Option<RawState>,
    delay: Option<Duration>,
    last_action: Option<(EntityId, RawState)>,
    calls: Calls,
}

#[derive(Clone, Default)]
pub struct FakeSource {
    inner: Arc<Mutex<Inner>>,
}

impl FakeSource {
    pub fn new(sensors: Vec<Sensor>) -> Self {
        let source = Self::default();
        source.inner.lock().sensors = sensors;
        source
    }

    pub fn set_sensor_entities(&self, sensor: SensorId, entities: Vec<Entity>) {
        self.inner.lock().entities.insert(sensor, entities);
    }

    pub fn set_states(&self, sensor: SensorId, states: Vec<StateReading>) {
        self.inner.lock().states.insert(sensor, states);
    }

    pub fn set_history(&self, entity: EntityId, samples: Vec<StateSample>) {
        self.inner.lock().history.insert(entity, samples);
    }

    pub fn fail_with(&self, error: TelemetryError) {
        self.inner.lock().failure = Some(error);
    }

    pub fn fail_sensor(&self, sensor: SensorId, error: TelemetryError) {
        self.inner.lock().sensor_failures.insert(sensor, error);
    }

    pub fn fail_actions(&self, error: TelemetryError) {
        self.inner.lock().action_failure = Some(error);
    }

    pub fn recover(&self) {
        let mut inner = self.inner.lock();
        inner.failure = None;
        inner.sensor_failures.clear();
        inner.action_failure = None;
    }

    /// Answer every action with `state` instead of echoing the request
    pub fn echo(&self, state: &str) {
        self.inner.lock().echo = Some(RawState::from(state));
    }

    pub fn delay(&self, delay: Duration) {
        self.inner.lock().delay = Some(delay);
    }

    pub fn calls(&self) -> Calls {
        self.inner.lock().calls
    }

    pub fn last_action(&self) -> Option<(EntityId, RawState)> {
        self.inner.lock().last_action.clone()
    }

    async fn pause(&self) {
        let delay = self.inner.lock().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn check(&self) -> TelemetryResult<()> {
        match &self.inner.lock().failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TelemetrySource for FakeSource {
    fn name(&self) -> &str {
        "fake"
    }

    async fn list_sensors(&self) -> TelemetryResult<Vec<Sensor>> {
        self.inner.lock().calls.list_sensors += 1;
        self.pause().await;
        self.check()?;
        Ok(self.inner.lock().sensors.clone())
    }

    async fn sensor_entities(&self, sensor_id: SensorId) -> TelemetryResult<Vec<Entity>> {
        self.inner.lock().calls.sensor_entities += 1;
        self.check()?;
        Ok(self
            .inner
            .lock()
            .entities
            .get(&sensor_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn sensor_states(&self, sensor_id: SensorId) -> TelemetryResult<Vec<StateReading>> {
        self.inner.lock().calls.sensor_states += 1;
        self.pause().await;
        self.check()?;
        let inner = self.inner.lock();
        if let Some(err) = inner.sensor_failures.get(&sensor_id) {
            return Err(err.clone());
        }
        Ok(inner.states.get(&sensor_id).cloned().unwrap_or_default())
    }

    async fn entity_history(
        &self,
        entity_id: EntityId,
        limit: usize,
    ) -> TelemetryResult<Vec<StateSample>> {
        self.inner.lock().calls.entity_history += 1;
        self.pause().await;
        self.check()?;
        let inner = self.inner.lock();
        let samples = inner.history.get(&entity_id).cloned().unwrap_or_default();
        Ok(samples.into_iter().take(limit).collect())
    }

    async fn set_state(
        &self,
        entity_id: EntityId,
        desired: &RawState,
    ) -> TelemetryResult<RawState> {
        self.inner.lock().calls.set_state += 1;
        self.pause().await;
        self.check()?;
        let mut inner = self.inner.lock();
        if let Some(err) = &inner.action_failure {
            return Err(err.clone());
        }
        inner.last_action = Some((entity_id, desired.clone()));
        Ok(inner.echo.clone().unwrap_or_else(|| desired.clone()))
    }
}

fn entity(id: i64, name: &str, unit: Option<&str>, sensor: i64) -> Entity {
    Entity {
        id: EntityId(id),
        name: name.to_owned(),
        unit: unit.map(str::to_owned),
        sensor_id: SensorId(sensor),
    }
}

fn sensor(id: i64, name: &str, entities: Vec<Entity>) -> Sensor {
    Sensor {
        id: SensorId(id),
        name: name.to_owned(),
        entities,
    }
}

/// The sensor layout of a typical installation
pub fn camper_catalog() -> SensorCatalog {
    SensorCatalog::new(vec![
        sensor(
            1,
            "camper",
            vec![
                entity(10, "household_state", None, 1),
                entity(11, "pump_state", None, 1),
                entity(12, "water_state", Some("%"), 1),
                entity(13, "waste_state", Some("%"), 1),
                entity(14, "mains_voltage", Some("mV"), 1),
                entity(15, "starter_voltage", Some("mV"), 1),
                entity(16, "household_voltage", Some("mV"), 1),
            ],
        ),
        sensor(
            2,
            "SmartShunt",
            vec![
                entity(20, "soc", Some("%"), 2),
                entity(21, "remaining_mins", Some("min"), 2),
                entity(22, "consumed_ah", Some("Ah"), 2),
            ],
        ),
        sensor(
            3,
            "SmartSolar",
            vec![
                entity(30, "solar_power", Some("W"), 3),
                entity(31, "yield_today", Some("kWh"), 3),
                entity(32, "charge_state", None, 3),
            ],
        ),
        sensor(
            4,
            "outside",
            vec![
                entity(40, "temperature", Some("°C"), 4),
                entity(41, "humidity", Some("%"), 4),
            ],
        ),
        sensor(
            5,
            "inside",
            vec![
                entity(50, "temperature", Some("°C"), 5),
                entity(51, "humidity", Some("%"), 5),
            ],
        ),
    ])
}

pub fn reading(entity_id: i64, state: &str) -> StateReading {
    StateReading {
        entity_id: EntityId(entity_id),
        state: RawState::from(state),
    }
}

/// A source serving [`camper_catalog`] with a healthy camper sensor
pub fn camper_source() -> FakeSource {
    let source = FakeSource::new(camper_catalog().sensors().to_vec());
    source.set_states(
        SensorId(1),
        vec![
            reading(10, "ON"),
            reading(11, "OFF"),
            reading(12, "5500"),
            reading(13, "2000"),
            reading(14, "230000"),
            reading(15, "12600"),
            reading(16, "11800"),
        ],
    );
    source
}
