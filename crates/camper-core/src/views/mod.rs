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

//! Tab-style views and the loop that keeps them refreshed.
//!
//! Exactly one [`ViewId`] is active at a time. The owning container announces
//! changes through a [`ViewSwitcher`]; each view task reacts by polling
//! (active) or resetting its state (inactive).

mod history;
mod messages;
mod panel;
mod runner;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

pub use history::{
    DEFAULT_HISTORY_LIMIT, HistoryCommand, HistoryFrame, HistorySettings, HistoryUpdate,
    HistoryView, load_chart,
};
pub use messages::MessagesView;
pub use panel::{PanelCommand, PanelUpdate, PanelView};
pub use runner::{ViewHandle, run_view, spawn_view};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewId {
    #[default]
    Status,
    History,
    Messages,
}

impl ViewId {
    pub const ALL: [Self; 3] = [Self::Status, Self::History, Self::Messages];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Status => "Status",
            Self::History => "History",
            Self::Messages => "Messages",
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown view `{s}` (expected status, history or messages)"))
    }
}

/// Publishes the active view to every view task
#[derive(Debug, Clone)]
pub struct ViewSwitcher {
    tx: watch::Sender<ViewId>,
}

impl ViewSwitcher {
    pub fn new(initial: ViewId) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewId> {
        self.tx.subscribe()
    }

    pub fn active(&self) -> ViewId {
        *self.tx.borrow()
    }

    /// Returns `false` when `view` was already active
    pub fn switch_to(&self, view: ViewId) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
        if changed {
            info!("🗂️ Active view: {view}");
        }
        changed
    }
}

/// Background work started by a view, run on the tokio worker pool
pub type Job<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// A view driven by [`run_view`].
///
/// Network work happens in [`Job`]s that own everything they need; all state
/// mutation happens in [`View::apply`] on the view's own task.
pub trait View: Send + 'static {
    type Update: Send + 'static;
    type Command: fmt::Debug + Send + 'static;
    type Frame: Clone + Send + Sync + 'static;

    fn name(&self) -> &'static str;

    fn id(&self) -> ViewId;

    /// Delay between the end of one refresh and the start of the next
    fn poll_interval(&self) -> Duration;

    fn start_refresh(&mut self) -> Job<Self::Update>;

    /// `None` when the command needs no background work
    fn start_command(&mut self, command: Self::Command) -> Option<Job<Self::Update>>;

    fn apply(&mut self, update: Self::Update);

    /// Forget displayed state; called when the view is hidden
    fn deactivate(&mut self);

    fn frame(&self) -> Self::Frame;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_id_parsing() {
        assert_eq!("status".parse::<ViewId>(), Ok(ViewId::Status));
        assert_eq!(" History ".parse::<ViewId>(), Ok(ViewId::History));
        assert!("settings".parse::<ViewId>().is_err());
        assert_eq!(ViewId::Messages.to_string(), "Messages");
    }

    #[test]
    fn test_switcher_notifies_subscribers() {
        let switcher = ViewSwitcher::new(ViewId::Status);
        let mut rx = switcher.subscribe();

        assert!(!switcher.switch_to(ViewId::Status));
        assert!(!rx.has_changed().unwrap());

        assert!(switcher.switch_to(ViewId::History));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ViewId::History);
        assert_eq!(switcher.active(), ViewId::History);
    }
}
