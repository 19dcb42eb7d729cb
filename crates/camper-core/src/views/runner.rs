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
use std::future;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{View, ViewId};

const COMMAND_QUEUE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobKind {
    Refresh,
    Command,
}

struct InFlight<T> {
    generation: u64,
    kind: JobKind,
    handle: JoinHandle<T>,
}

/// Wait for the in-flight job, or forever when there is none
async fn join_in_flight<T>(slot: &mut Option<InFlight<T>>) -> (u64, JobKind, Result<T, JoinError>) {
    match slot.as_mut() {
        Some(job) => {
            let result = (&mut job.handle).await;
            (job.generation, job.kind, result)
        }
        None => future::pending().await,
    }
}

/// Handle to a spawned view task
pub struct ViewHandle<V: View> {
    pub commands: mpsc::Sender<V::Command>,
    pub frames: watch::Receiver<V::Frame>,
    pub task: JoinHandle<()>,
}

impl<V: View> fmt::Debug for ViewHandle<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewHandle")
            .field("finished", &self.task.is_finished())
            .finish_non_exhaustive()
    }
}

impl<V: View> ViewHandle<V> {
    /// Queue a command; `false` once the view task has stopped
    pub async fn send(&self, command: V::Command) -> bool {
        self.commands.send(command).await.is_ok()
    }

    pub fn frame(&self) -> V::Frame {
        self.frames.borrow().clone()
    }
}

/// Spawn [`run_view`] on the current runtime
pub fn spawn_view<V: View>(
    view: V,
    active: watch::Receiver<ViewId>,
    cancel: CancellationToken,
) -> ViewHandle<V> {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);
    let (frame_tx, frame_rx) = watch::channel(view.frame());
    let task = tokio::spawn(run_view(view, active, command_rx, frame_tx, cancel));

    ViewHandle {
        commands: command_tx,
        frames: frame_rx,
        task,
    }
}

/// Drive a view until cancelled.
///
/// While the view is active it refreshes immediately, then `poll_interval`
/// after each refresh completes. At most one job is in flight; commands wait
/// in the queue until it finishes. A job result is applied only if the view
/// is still active and has not been toggled since the job started.
pub async fn run_view<V: View>(
    mut view: V,
    mut active: watch::Receiver<ViewId>,
    mut commands: mpsc::Receiver<V::Command>,
    frames: watch::Sender<V::Frame>,
    cancel: CancellationToken,
) {
    let name = view.name();
    let mut is_active = *active.borrow_and_update() == view.id();
    let mut generation: u64 = 0;
    let mut in_flight: Option<InFlight<V::Update>> = None;
    let mut next_poll = Instant::now();
    let mut commands_open = true;

    info!("🔄 View '{name}' started (active: {is_active})");
    if !is_active {
        view.deactivate();
        frames.send_replace(view.frame());
    }

    loop {
        let busy = in_flight.is_some();

        tokio::select! {
            () = cancel.cancelled() => {
                debug!("View '{name}' cancelled");
                break;
            }

            changed = active.changed() => {
                if changed.is_err() {
                    debug!("View '{name}': switcher dropped");
                    break;
                }
                let now_active = *active.borrow_and_update() == view.id();
                if now_active != is_active {
                    is_active = now_active;
                    generation += 1;
                    if is_active {
                        debug!("View '{name}' activated");
                        next_poll = Instant::now();
                    } else {
                        debug!("View '{name}' deactivated");
                        view.deactivate();
                        frames.send_replace(view.frame());
                    }
                }
            }

            command = commands.recv(), if commands_open && !busy => {
                match command {
                    Some(command) if is_active => {
                        debug!("View '{name}' command: {command:?}");
                        if let Some(job) = view.start_command(command) {
                            in_flight = Some(InFlight {
                                generation,
                                kind: JobKind::Command,
                                handle: tokio::spawn(job),
                            });
                        }
                        frames.send_replace(view.frame());
                    }
                    Some(command) => {
                        warn!("⚠️ View '{name}' is inactive, dropping command {command:?}");
                    }
                    None => commands_open = false,
                }
            }

            () = tokio::time::sleep_until(next_poll), if is_active && !busy => {
                in_flight = Some(InFlight {
                    generation,
                    kind: JobKind::Refresh,
                    handle: tokio::spawn(view.start_refresh()),
                });
            }

            (job_generation, kind, result) = join_in_flight(&mut in_flight) => {
                in_flight = None;
                let current = job_generation == generation;
                if !current && is_active {
                    // reactivated while the job ran; its result is dropped below
                    next_poll = Instant::now();
                } else if kind == JobKind::Refresh {
                    next_poll = Instant::now() + view.poll_interval();
                }

                match result {
                    Ok(update) if is_active && current => {
                        view.apply(update);
                        frames.send_replace(view.frame());
                    }
                    Ok(_) => debug!("View '{name}': discarding stale {kind:?} result"),
                    Err(e) => error!("❌ View '{name}' {kind:?} job failed: {e}"),
                }
            }
        }
    }

    if let Some(job) = in_flight {
        job.handle.abort();
    }
    info!("🛑 View '{name}' stopped");
}
