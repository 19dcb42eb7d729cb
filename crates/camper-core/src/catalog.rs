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

use std::collections::HashMap;

use camper_types::{Entity, EntityId, Sensor, SensorId};
use tracing::{debug, info};

use crate::entities::EntitySet;
use crate::errors::{TelemetryError, TelemetryResult};
use crate::traits::TelemetrySource;

/// Sensor metadata as reported by `GET /sensors`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorCatalog {
    sensors: Vec<Sensor>,
}

/// A `(sensor, entity)` pair offered for charting, keyed `"{sensor}_{entity}"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartableEntity {
    pub key: String,
    pub sensor_id: SensorId,
    pub sensor_name: String,
    pub entity_id: EntityId,
    pub entity_name: String,
    pub unit: Option<String>,
}

impl SensorCatalog {
    pub fn new(sensors: Vec<Sensor>) -> Self {
        Self { sensors }
    }

    /// Fetch the sensor list, filling in entities for sensors listed without them
    pub async fn load(source: &dyn TelemetrySource) -> TelemetryResult<Self> {
        let mut sensors = source.list_sensors().await?;
        for sensor in &mut sensors {
            if sensor.entities.is_empty() {
                debug!("Fetching entities for sensor {} ({})", sensor.name, sensor.id);
                sensor.entities = source.sensor_entities(sensor.id).await?;
            }
        }

        info!(
            "📡 Loaded {} sensors with {} entities from {}",
            sensors.len(),
            sensors.iter().map(|s| s.entities.len()).sum::<usize>(),
            source.name()
        );
        Ok(Self::new(sensors))
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn sensor(&self, name: &str) -> Option<&Sensor> {
        self.sensors.iter().find(|s| s.name == name)
    }

    pub fn entity(&self, sensor: &str, entity: &str) -> Option<&Entity> {
        self.sensor(sensor).and_then(|s| s.entity(entity))
    }

    pub fn entity_by_id(&self, id: EntityId) -> Option<(&Sensor, &Entity)> {
        self.sensors.iter().find_map(|sensor| {
            sensor
                .entities
                .iter()
                .find(|e| e.id == id)
                .map(|entity| (sensor, entity))
        })
    }

    /// Every entity of every sensor, in API order
    pub fn chartable(&self) -> Vec<ChartableEntity> {
        self.sensors
            .iter()
            .flat_map(|sensor| {
                sensor.entities.iter().map(move |entity| ChartableEntity {
                    key: format!("{}_{}", sensor.name, entity.name),
                    sensor_id: sensor.id,
                    sensor_name: sensor.name.clone(),
                    entity_id: entity.id,
                    entity_name: entity.name.clone(),
                    unit: entity.unit.clone(),
                })
            })
            .collect()
    }

    pub fn chartable_entity(&self, key: &str) -> Option<ChartableEntity> {
        self.chartable().into_iter().find(|c| c.key == key)
    }
}

/// Entity and sensor ids resolved for one [`EntitySet`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bindings<K: EntitySet> {
    ids: HashMap<K, EntityId>,
    keys: HashMap<EntityId, K>,
    sensors: Vec<SensorId>,
}

impl<K: EntitySet> Bindings<K> {
    /// Bind every member of `K` against the catalog.
    ///
    /// Any missing sensor or entity is an [`TelemetryError::ApiContractViolation`].
    pub fn resolve(catalog: &SensorCatalog) -> TelemetryResult<Self> {
        let mut ids = HashMap::with_capacity(K::ALL.len());
        let mut keys = HashMap::with_capacity(K::ALL.len());
        let mut sensors = Vec::new();

        for &key in K::ALL {
            let sensor = catalog.sensor(key.sensor()).ok_or_else(|| {
                TelemetryError::contract(format!(
                    "No sensor_id for `{}` in API sensor list.",
                    key.sensor()
                ))
            })?;
            let entity = sensor.entity(key.entity()).ok_or_else(|| {
                TelemetryError::contract(format!(
                    "No entity_id for `{}` of sensor `{}`.",
                    key.entity(),
                    key.sensor()
                ))
            })?;

            ids.insert(key, entity.id);
            keys.insert(entity.id, key);
            if !sensors.contains(&sensor.id) {
                sensors.push(sensor.id);
            }
        }

        debug!(
            "Resolved {} {} entities across {} sensors",
            ids.len(),
            K::NAME,
            sensors.len()
        );
        Ok(Self { ids, keys, sensors })
    }

    pub async fn load(source: &dyn TelemetrySource) -> TelemetryResult<Self> {
        let catalog = SensorCatalog::load(source).await?;
        Self::resolve(&catalog)
    }

    pub fn entity_id(&self, key: K) -> Option<EntityId> {
        self.ids.get(&key).copied()
    }

    pub fn key_for(&self, entity_id: EntityId) -> Option<K> {
        self.keys.get(&entity_id).copied()
    }

    /// Sensors to poll, in the order their first entity appears in `K::ALL`
    pub fn sensors(&self) -> &[SensorId] {
        &self.sensors
    }
}
