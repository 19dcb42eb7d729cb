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

use camper_types::RawState;

use super::{Job, View, ViewId};
use crate::cache::{
    ActionOutcome, EntityStateCache, RefreshOutcome, Snapshot, fetch_action, fetch_refresh,
};
use crate::entities::EntitySet;
use crate::messages::MessageLog;
use crate::traits::TelemetrySource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand<K> {
    /// Request `"ON"` if currently `"OFF"`, otherwise `"OFF"`
    Toggle(K),
    Set(K, RawState),
}

#[derive(Debug)]
pub enum PanelUpdate<K: EntitySet> {
    Refresh(RefreshOutcome<K>),
    Action(ActionOutcome<K>),
}

/// One entity-set panel on the Status tab
pub struct PanelView<K: EntitySet> {
    source: Arc<dyn TelemetrySource>,
    cache: EntityStateCache<K>,
    interval: Duration,
}

impl<K: EntitySet> fmt::Debug for PanelView<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelView")
            .field("source", &self.source.name())
            .field("cache", &self.cache)
            .field("interval", &self.interval)
            .finish()
    }
}

impl<K: EntitySet> PanelView<K> {
    pub fn new(source: Arc<dyn TelemetrySource>, log: MessageLog, interval: Duration) -> Self {
        Self {
            source,
            cache: EntityStateCache::new(log),
            interval,
        }
    }

    fn action_job(&self, key: K, desired: RawState) -> Job<PanelUpdate<K>> {
        let source = Arc::clone(&self.source);
        let bindings = self.cache.bindings().cloned();
        Box::pin(async move {
            PanelUpdate::Action(fetch_action(source.as_ref(), bindings, key, desired).await)
        })
    }
}

impl<K: EntitySet> View for PanelView<K> {
    type Update = PanelUpdate<K>;
    type Command = PanelCommand<K>;
    type Frame = Snapshot<K>;

    fn name(&self) -> &'static str {
        K::NAME
    }

    fn id(&self) -> ViewId {
        ViewId::Status
    }

    fn poll_interval(&self) -> Duration {
        self.interval
    }

    fn start_refresh(&mut self) -> Job<Self::Update> {
        let source = Arc::clone(&self.source);
        let bindings = self.cache.bindings().cloned();
        Box::pin(async move {
            PanelUpdate::Refresh(fetch_refresh(source.as_ref(), bindings).await)
        })
    }

    fn start_command(&mut self, command: Self::Command) -> Option<Job<Self::Update>> {
        match command {
            PanelCommand::Toggle(key) => {
                let desired = self.cache.toggle_target(key);
                Some(self.action_job(key, desired))
            }
            PanelCommand::Set(key, desired) => Some(self.action_job(key, desired)),
        }
    }

    fn apply(&mut self, update: Self::Update) {
        match update {
            PanelUpdate::Refresh(outcome) => {
                self.cache.apply_refresh(outcome);
            }
            PanelUpdate::Action(outcome) => {
                // failures are already logged and shown as Unknown
                self.cache.apply_action(outcome).ok();
            }
        }
    }

    fn deactivate(&mut self) {
        self.cache.deactivate();
    }

    fn frame(&self) -> Self::Frame {
        self.cache.snapshot()
    }
}
