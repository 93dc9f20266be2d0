/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Input dispatch worker that fans events out to the routes of one input.

use crate::control_plane::route_table::InputRoutes;
use crate::device::EventReceiver;
use crate::event::Event;
use crate::observability::events;
use crate::observability::fields::{self, WorkerContext};
use crate::runtime::worker_runtime::{
    spawn_dispatch_loop, DispatchLoopHandle, DEFAULT_DISPATCH_RUNTIME_THREAD_NAME,
};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tracing::{debug, info, warn, Level};
use uuid::Uuid;

const DISPATCH_RUNTIME_THREAD_NAME_PREFIX: &str = "mux-in-";
const DISPATCH_RUNTIME_THREAD_NAME_MAX_LEN: usize = 15;
const COMPONENT: &str = "dispatch_worker";

/// Stop state a [`DispatchPool`](crate::data_plane::dispatch_pool::DispatchPool)
/// publishes to its workers.
///
/// Every stop bumps the epoch. A worker retires as soon as the epoch differs from
/// the one it was spawned under, so clearing `stopped` afterwards never revives it.
/// A worker spawned while `stopped` is set idles until it is cleared.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct StopSignal {
    pub(crate) epoch: u64,
    pub(crate) stopped: bool,
}

impl StopSignal {
    /// Retires every worker spawned so far.
    pub(crate) fn stop(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.stopped = true;
    }

    pub(crate) fn resume(&mut self) {
        self.stopped = false;
    }
}

/// Marks a dispatch loop alive, in the pool count and on its input's routes, until
/// it is dropped.
pub(crate) struct ActiveWorkerGuard {
    active: Arc<AtomicUsize>,
    routes: Arc<InputRoutes>,
}

impl ActiveWorkerGuard {
    pub(crate) fn new(active: Arc<AtomicUsize>, routes: Arc<InputRoutes>) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        routes.set_dispatching(true);
        Self { active, routes }
    }
}

impl Drop for ActiveWorkerGuard {
    fn drop(&mut self) {
        self.routes.set_dispatching(false);
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Outcome of dispatching one event across an input's routes.
#[derive(Debug, Eq, PartialEq)]
enum DispatchOutcome {
    Continue,
    Stopped,
}

/// Worker state that owns the spawned dispatch thread handle.
pub(crate) struct InputDispatchWorker {
    worker_id: String,
    input: String,
    dispatch_handle: DispatchLoopHandle,
}

impl InputDispatchWorker {
    /// Spawns a dedicated runtime thread running the dispatch loop of one input.
    pub(crate) fn new(
        routes: Arc<InputRoutes>,
        receiver: EventReceiver,
        shutdown: watch::Receiver<StopSignal>,
        active: Arc<AtomicUsize>,
    ) -> io::Result<Self> {
        let worker_id = Uuid::new_v4().to_string();
        let runtime_thread_name = Self::build_runtime_thread_name(&worker_id);
        let worker_id_for_loop = worker_id.clone();
        let input = routes.input().name().to_string();
        let epoch = shutdown.borrow().epoch;
        let guard = ActiveWorkerGuard::new(active, routes.clone());

        let dispatch_handle = spawn_dispatch_loop(runtime_thread_name, move || async move {
            let _guard = guard;
            Self::dispatch_loop(worker_id_for_loop, routes, receiver, shutdown, epoch).await;
        })?;

        Ok(Self {
            worker_id,
            input,
            dispatch_handle,
        })
    }

    /// Returns the unique worker identifier for correlation logs.
    pub(crate) fn worker_id(&self) -> &str {
        &self.worker_id
    }

    pub(crate) fn input(&self) -> &str {
        &self.input
    }

    /// Returns the worker runtime thread label for diagnostics.
    pub(crate) fn runtime_thread(&self) -> &str {
        self.dispatch_handle.worker_thread()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.dispatch_handle.is_finished()
    }

    fn build_runtime_thread_name(worker_id: &str) -> String {
        let suffix_len =
            DISPATCH_RUNTIME_THREAD_NAME_MAX_LEN - DISPATCH_RUNTIME_THREAD_NAME_PREFIX.len();
        let suffix: String = worker_id
            .chars()
            .filter(|ch| ch.is_ascii_hexdigit())
            .take(suffix_len)
            .collect();

        if suffix.len() == suffix_len {
            format!("{DISPATCH_RUNTIME_THREAD_NAME_PREFIX}{suffix}")
        } else {
            DEFAULT_DISPATCH_RUNTIME_THREAD_NAME.to_string()
        }
    }

    /// Runs until the inbound sequence closes or a stop retires `epoch`.
    pub(crate) async fn dispatch_loop(
        worker_id: String,
        routes: Arc<InputRoutes>,
        mut receiver: EventReceiver,
        mut shutdown: watch::Receiver<StopSignal>,
        epoch: u64,
    ) {
        let worker_context = WorkerContext::with_current_thread(worker_id);
        let input = routes.input().name().to_string();

        loop {
            if !runnable(&mut shutdown, epoch).await {
                Self::log_stop(&worker_context, &input);
                break;
            }

            let received = tokio::select! {
                biased;
                _ = retired(&mut shutdown, epoch) => {
                    Self::log_stop(&worker_context, &input);
                    break;
                }
                received = receiver.recv() => received,
            };

            match received {
                Ok(event) => {
                    let outcome = Self::dispatch_event(
                        &worker_context,
                        &input,
                        &routes,
                        event,
                        &mut shutdown,
                        epoch,
                    )
                    .await;
                    if outcome == DispatchOutcome::Stopped {
                        Self::log_stop(&worker_context, &input);
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        event = events::DISPATCH_RECV_LAGGED,
                        component = COMPONENT,
                        worker_id = worker_context.worker_id.as_str(),
                        worker_thread = worker_context.worker_thread.as_str(),
                        input = input.as_str(),
                        skipped,
                        "inbound sequence lagged; events were dropped"
                    );
                }
                Err(RecvError::Closed) => {
                    info!(
                        event = events::DISPATCH_RECV_CLOSED,
                        component = COMPONENT,
                        worker_id = worker_context.worker_id.as_str(),
                        worker_thread = worker_context.worker_thread.as_str(),
                        input = input.as_str(),
                        reason = fields::REASON_BROADCAST_CLOSED,
                        "inbound sequence closed; stopping dispatch loop"
                    );
                    break;
                }
            }
        }
    }

    async fn dispatch_event(
        worker_context: &WorkerContext,
        input: &str,
        routes: &InputRoutes,
        event: Event,
        shutdown: &mut watch::Receiver<StopSignal>,
        epoch: u64,
    ) -> DispatchOutcome {
        let snapshot = routes.snapshot();
        let formatted_event = tracing::enabled!(Level::DEBUG).then(|| fields::format_event(&event));

        if let Some(midi_event) = formatted_event.as_deref() {
            debug!(
                event = events::DISPATCH_RECEIVE,
                component = COMPONENT,
                worker_id = worker_context.worker_id.as_str(),
                input,
                midi_event,
                route_count = snapshot.len(),
                "dispatching event"
            );
        }

        for (route_index, route) in snapshot.iter().enumerate() {
            let output = route.output().name();

            if !route.accepts(event) {
                if let Some(midi_event) = formatted_event.as_deref() {
                    debug!(
                        event = events::DISPATCH_FILTERED,
                        component = COMPONENT,
                        worker_id = worker_context.worker_id.as_str(),
                        input,
                        output,
                        route_index,
                        midi_event,
                        "event rejected by route filter"
                    );
                }
                continue;
            }

            let forwarded = route.transform(event);

            let sink = match route.output().outgoing() {
                Ok(sink) => sink,
                Err(err) => {
                    warn!(
                        event = events::DISPATCH_SINK_UNAVAILABLE,
                        component = COMPONENT,
                        worker_id = worker_context.worker_id.as_str(),
                        worker_thread = worker_context.worker_thread.as_str(),
                        input,
                        output,
                        route_index,
                        err = %err,
                        "output sink unavailable; dropping event for route"
                    );
                    continue;
                }
            };

            tokio::select! {
                biased;
                _ = retired(shutdown, epoch) => {
                    return DispatchOutcome::Stopped;
                }
                sent = sink.send(forwarded) => match sent {
                    Ok(()) => {
                        if tracing::enabled!(Level::DEBUG) {
                            debug!(
                                event = events::DISPATCH_FORWARD_OK,
                                component = COMPONENT,
                                worker_id = worker_context.worker_id.as_str(),
                                input,
                                output,
                                route_index,
                                midi_event = fields::format_event(&forwarded).as_str(),
                                "event forwarded"
                            );
                        }
                    }
                    Err(_) => {
                        warn!(
                            event = events::DISPATCH_FORWARD_FAILED,
                            component = COMPONENT,
                            worker_id = worker_context.worker_id.as_str(),
                            worker_thread = worker_context.worker_thread.as_str(),
                            input,
                            output,
                            route_index,
                            reason = fields::REASON_SINK_CLOSED,
                            "output sink closed; dropping event for route"
                        );
                    }
                },
            }
        }

        DispatchOutcome::Continue
    }

    fn log_stop(worker_context: &WorkerContext, input: &str) {
        info!(
            event = events::DISPATCH_STOP_SIGNAL,
            component = COMPONENT,
            worker_id = worker_context.worker_id.as_str(),
            worker_thread = worker_context.worker_thread.as_str(),
            input,
            reason = fields::REASON_STOP_REQUESTED,
            "stop requested; stopping dispatch loop"
        );
    }
}

/// Waits while the pool is stopped under `epoch`. Returns false once the worker is
/// retired or the stop sender is gone.
async fn runnable(shutdown: &mut watch::Receiver<StopSignal>, epoch: u64) -> bool {
    loop {
        let signal = *shutdown.borrow_and_update();
        if signal.epoch != epoch {
            return false;
        }
        if !signal.stopped {
            return true;
        }
        if shutdown.changed().await.is_err() {
            return false;
        }
    }
}

/// Resolves once a stop moves past `epoch` or the stop sender is gone.
async fn retired(shutdown: &mut watch::Receiver<StopSignal>, epoch: u64) {
    loop {
        if shutdown.borrow_and_update().epoch != epoch {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
