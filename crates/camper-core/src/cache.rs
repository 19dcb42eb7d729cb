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

//! Per-view cache of entity values.
//!
//! The cache owns one [`EntityValue`] for every member of its entity set.
//! Network work is split from mutation: `fetch_*` functions perform the
//! requests and return an outcome, `apply_*` methods fold an outcome into the
//! cache. Views run the fetch as a background job and apply the result only
//! if it is still current.

use std::collections::HashMap;

use camper_types::{EntityValue, RawState};
use tracing::{debug, info, warn};

use crate::catalog::Bindings;
use crate::entities::EntitySet;
use crate::errors::{TelemetryError, TelemetryResult};
use crate::messages::MessageLog;
use crate::traits::TelemetrySource;

static UNKNOWN: EntityValue = EntityValue::Unknown;

/// Outcome of a refresh cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshResult {
    Success,
    Failure(TelemetryError),
}

impl RefreshResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Result of [`fetch_refresh`], not yet applied to a cache
#[derive(Debug)]
pub struct RefreshOutcome<K: EntitySet> {
    resolved: Option<Bindings<K>>,
    result: TelemetryResult<Vec<(K, RawState)>>,
}

/// Result of [`fetch_action`], not yet applied to a cache
#[derive(Debug)]
pub struct ActionOutcome<K: EntitySet> {
    key: K,
    resolved: Option<Bindings<K>>,
    result: TelemetryResult<RawState>,
}

impl<K: EntitySet> ActionOutcome<K> {
    pub fn key(&self) -> K {
        self.key
    }
}

/// Read-only copy of a cache's values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<K: EntitySet> {
    values: HashMap<K, EntityValue>,
}

impl<K: EntitySet> Snapshot<K> {
    /// Value for `key`; total over the entity set
    pub fn get(&self, key: K) -> &EntityValue {
        self.values.get(&key).unwrap_or(&UNKNOWN)
    }

    /// Values in display order
    pub fn iter(&self) -> impl Iterator<Item = (K, &EntityValue)> + '_ {
        K::ALL.iter().map(|&key| (key, self.get(key)))
    }

    pub fn all_unknown(&self) -> bool {
        self.values.values().all(EntityValue::is_unknown)
    }
}

impl<K: EntitySet> Default for Snapshot<K> {
    fn default() -> Self {
        Self {
            values: K::ALL.iter().map(|&k| (k, EntityValue::Unknown)).collect(),
        }
    }
}

async fn ensure_bindings<K: EntitySet>(
    source: &dyn TelemetrySource,
    bindings: Option<Bindings<K>>,
) -> TelemetryResult<(Bindings<K>, bool)> {
    match bindings {
        Some(bindings) => Ok((bindings, false)),
        None => Ok((Bindings::load(source).await?, true)),
    }
}

/// Fetch the latest state of every entity in `K`.
///
/// Resolves ids first when `bindings` is `None`. Sensors are queried in
/// binding order and the first failure aborts the cycle.
pub async fn fetch_refresh<K: EntitySet>(
    source: &dyn TelemetrySource,
    bindings: Option<Bindings<K>>,
) -> RefreshOutcome<K> {
    let (bindings, fresh) = match ensure_bindings(source, bindings).await {
        Ok(resolved) => resolved,
        Err(err) => {
            return RefreshOutcome {
                resolved: None,
                result: Err(err),
            };
        }
    };

    let mut updates = Vec::with_capacity(K::ALL.len());
    let mut result = Ok(());
    for &sensor_id in bindings.sensors() {
        match source.sensor_states(sensor_id).await {
            Ok(readings) => updates.extend(
                readings
                    .into_iter()
                    .filter_map(|r| bindings.key_for(r.entity_id).map(|key| (key, r.state))),
            ),
            Err(err) => {
                result = Err(err);
                break;
            }
        }
    }

    RefreshOutcome {
        resolved: fresh.then_some(bindings),
        result: result.map(|()| updates),
    }
}

/// Request `desired` for a writable entity and return the adopted state
pub async fn fetch_action<K: EntitySet>(
    source: &dyn TelemetrySource,
    bindings: Option<Bindings<K>>,
    key: K,
    desired: RawState,
) -> ActionOutcome<K> {
    if !key.writable() {
        return ActionOutcome {
            key,
            resolved: None,
            result: Err(TelemetryError::contract(format!(
                "`{}` is not a writable entity",
                key.entity()
            ))),
        };
    }

    let (bindings, fresh) = match ensure_bindings(source, bindings).await {
        Ok(resolved) => resolved,
        Err(err) => {
            return ActionOutcome {
                key,
                resolved: None,
                result: Err(err),
            };
        }
    };

    let result = match bindings.entity_id(key) {
        Some(entity_id) => {
            info!("🔌 Requesting {} = {} (entity {})", key.entity(), desired, entity_id);
            source.set_state(entity_id, &desired).await
        }
        None => Err(TelemetryError::contract(format!(
            "No entity_id for `{}`.",
            key.entity()
        ))),
    };

    ActionOutcome {
        key,
        resolved: fresh.then_some(bindings),
        result,
    }
}

/// Latest known values for one entity set, plus the ids they were fetched by
#[derive(Debug)]
pub struct EntityStateCache<K: EntitySet> {
    values: HashMap<K, EntityValue>,
    bindings: Option<Bindings<K>>,
    log: MessageLog,
}

impl<K: EntitySet> EntityStateCache<K> {
    pub fn new(log: MessageLog) -> Self {
        Self {
            values: K::ALL.iter().map(|&k| (k, EntityValue::Unknown)).collect(),
            bindings: None,
            log,
        }
    }

    pub fn bindings(&self) -> Option<&Bindings<K>> {
        self.bindings.as_ref()
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn get(&self, key: K) -> &EntityValue {
        self.values.get(&key).unwrap_or(&UNKNOWN)
    }

    pub fn snapshot(&self) -> Snapshot<K> {
        Snapshot {
            values: self.values.clone(),
        }
    }

    /// Fetch and apply in one step
    pub async fn refresh(&mut self, source: &dyn TelemetrySource) -> RefreshResult {
        let outcome = fetch_refresh(source, self.bindings.clone()).await;
        self.apply_refresh(outcome)
    }

    /// Fold a refresh outcome into the cache.
    ///
    /// On success values are merged all at once; entities absent from the
    /// response keep their previous value. On failure every value becomes
    /// Unknown and one error message is logged.
    pub fn apply_refresh(&mut self, outcome: RefreshOutcome<K>) -> RefreshResult {
        if let Some(bindings) = outcome.resolved {
            self.bindings = Some(bindings);
        }

        match outcome.result {
            Ok(updates) => {
                debug!("Refreshed {} {} values", updates.len(), K::NAME);
                for (key, state) in updates {
                    self.values.insert(key, EntityValue::Known(state));
                }
                RefreshResult::Success
            }
            Err(err) => {
                warn!("❌ [API ERROR] {} refresh failed: {}", K::NAME, err);
                self.reset_values();
                if err.is_contract_violation() {
                    self.bindings = None;
                }
                self.log.error(
                    format!("Could not retrieve status from API: {}", err.kind_name()),
                    Some(err.to_string()),
                );
                RefreshResult::Failure(err)
            }
        }
    }

    /// Request a state for a writable entity and adopt the server's answer
    pub async fn set_entity_state(
        &mut self,
        source: &dyn TelemetrySource,
        key: K,
        desired: impl Into<RawState>,
    ) -> TelemetryResult<EntityValue> {
        let outcome = fetch_action(source, self.bindings.clone(), key, desired.into()).await;
        self.apply_action(outcome)
    }

    /// Fold an action outcome into the cache.
    ///
    /// Only the targeted entity changes: the echoed state on success, Unknown
    /// on failure.
    pub fn apply_action(&mut self, outcome: ActionOutcome<K>) -> TelemetryResult<EntityValue> {
        if let Some(bindings) = outcome.resolved {
            self.bindings = Some(bindings);
        }

        let key = outcome.key;
        match outcome.result {
            Ok(state) => {
                info!("✅ {} is now {}", key.entity(), state);
                let value = EntityValue::Known(state);
                self.values.insert(key, value.clone());
                Ok(value)
            }
            Err(err) => {
                warn!("❌ [API ERROR] Updating {} failed: {}", key.entity(), err);
                self.values.insert(key, EntityValue::Unknown);
                self.log.error(
                    format!(
                        "Could not update {} state in API: {}",
                        key.label().to_lowercase(),
                        err.kind_name()
                    ),
                    Some(err.to_string()),
                );
                Err(err)
            }
        }
    }

    /// State a toggle of `key` should request: `"ON"` only when currently `"OFF"`
    pub fn toggle_target(&self, key: K) -> RawState {
        if self.get(key).is("OFF") {
            RawState::from("ON")
        } else {
            RawState::from("OFF")
        }
    }

    /// Forget all values; used when the owning view is hidden
    pub fn deactivate(&mut self) {
        debug!("Resetting {} cache", K::NAME);
        self.reset_values();
    }

    fn reset_values(&mut self) {
        for value in self.values.values_mut() {
            *value = EntityValue::Unknown;
        }
    }
}
