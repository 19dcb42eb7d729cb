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

use std::convert::Infallible;
use std::time::Duration;

use camper_types::Message;

use super::{Job, View, ViewId};
use crate::display::MessageBoard;
use crate::messages::MessageLog;

/// Message board; reads the shared log, never the network
#[derive(Debug)]
pub struct MessagesView {
    log: MessageLog,
    messages: Vec<Message>,
    interval: Duration,
}

impl MessagesView {
    pub fn new(log: MessageLog, interval: Duration) -> Self {
        Self {
            log,
            messages: Vec::new(),
            interval,
        }
    }
}

impl View for MessagesView {
    type Update = Vec<Message>;
    type Command = Infallible;
    type Frame = MessageBoard;

    fn name(&self) -> &'static str {
        "messages"
    }

    fn id(&self) -> ViewId {
        ViewId::Messages
    }

    fn poll_interval(&self) -> Duration {
        self.interval
    }

    fn start_refresh(&mut self) -> Job<Self::Update> {
        let log = self.log.clone();
        Box::pin(async move { log.recent() })
    }

    fn start_command(&mut self, command: Self::Command) -> Option<Job<Self::Update>> {
        match command {}
    }

    fn apply(&mut self, update: Self::Update) {
        self.messages = update;
    }

    fn deactivate(&mut self) {
        self.messages.clear();
    }

    fn frame(&self) -> Self::Frame {
        MessageBoard::build(&self.messages)
    }
}
