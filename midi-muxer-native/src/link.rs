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

//! Threads that own native connections.
//!
//! Native bindings expect a connection to stay on the thread that created it. Each
//! connection therefore lives on its own named thread, which reports the outcome
//! of the connect step over a rendezvous channel before the caller continues.

use crate::backend::{BackendError, PortBackend, PortId};
use crate::observability::events;
use crossbeam_channel::{bounded, Receiver, Sender};
use midi_muxer::{DeviceError, Event};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

const COMPONENT: &str = "native_link";
const INPUT_THREAD_PREFIX: &str = "mux-rx-";
const OUTPUT_THREAD_PREFIX: &str = "mux-tx-";

/// Input connection held open on its own thread until [`InputLink::disconnect`].
pub(crate) struct InputLink {
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

impl InputLink {
    pub(crate) fn connect(
        backend: Arc<dyn PortBackend>,
        port: PortId,
        sink: broadcast::Sender<Event>,
    ) -> Result<Self, DeviceError> {
        let (ready_tx, ready_rx) = bounded(1);
        let (stop, stop_rx): (Sender<()>, Receiver<()>) = bounded(0);
        let device = port.name.clone();

        let thread = spawn_named(INPUT_THREAD_PREFIX, &device, move || {
            let connection = match backend.connect_input(&port, sink) {
                Ok(connection) => connection,
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return;
                }
            };
            let _ = ready_tx.send(Ok(()));

            // Returns once the link is dropped.
            let _ = stop_rx.recv();
            drop(connection);
            debug!(
                event = events::INPUT_DISCONNECT,
                component = COMPONENT,
                port = %port,
                "input connection dropped"
            );
        })?;

        match await_ready(&device, ready_rx) {
            Ok(()) => {
                info!(
                    event = events::INPUT_CONNECT_OK,
                    component = COMPONENT,
                    device = device.as_str(),
                    "input connected"
                );
                Ok(Self { stop, thread })
            }
            Err(err) => {
                let _ = thread.join();
                warn!(
                    event = events::INPUT_CONNECT_FAILED,
                    component = COMPONENT,
                    device = device.as_str(),
                    err = %err,
                    "input connect failed"
                );
                Err(err)
            }
        }
    }

    /// Drops the connection and waits for its thread to finish.
    pub(crate) fn disconnect(self) -> thread::Result<()> {
        drop(self.stop);
        self.thread.join()
    }
}

/// Connects an output port on a writer thread that drains `receiver` until every
/// sender is gone. Each event is written as its first [`Event::wire_len`] bytes.
pub(crate) fn spawn_writer(
    backend: Arc<dyn PortBackend>,
    port: PortId,
    mut receiver: mpsc::Receiver<Event>,
) -> Result<(), DeviceError> {
    let (ready_tx, ready_rx) = bounded(1);
    let device = port.name.clone();

    let thread = spawn_named(OUTPUT_THREAD_PREFIX, &device, move || {
        let mut connection = match backend.connect_output(&port) {
            Ok(connection) => connection,
            Err(err) => {
                let _ = ready_tx.send(Err(err));
                return;
            }
        };
        let _ = ready_tx.send(Ok(()));

        let mut written = 0usize;
        while let Some(event) = receiver.blocking_recv() {
            let bytes = event.to_bytes();
            match connection.send(&bytes[..event.wire_len()]) {
                Ok(()) => written += 1,
                Err(err) => {
                    warn!(
                        event = events::OUTPUT_WRITE_FAILED,
                        component = COMPONENT,
                        port = %port,
                        midi_event = %event,
                        err = %err,
                        "dropping event after write failure"
                    );
                }
            }
        }
        debug!(
            event = events::OUTPUT_WRITER_CLOSED,
            component = COMPONENT,
            port = %port,
            written,
            "output writer finished"
        );
    })?;

    match await_ready(&device, ready_rx) {
        Ok(()) => {
            info!(
                event = events::OUTPUT_CONNECT_OK,
                component = COMPONENT,
                device = device.as_str(),
                "output connected"
            );
            Ok(())
        }
        Err(err) => {
            let _ = thread.join();
            warn!(
                event = events::OUTPUT_CONNECT_FAILED,
                component = COMPONENT,
                device = device.as_str(),
                err = %err,
                "output connect failed"
            );
            Err(err)
        }
    }
}

fn await_ready(
    device: &str,
    ready: Receiver<Result<(), BackendError>>,
) -> Result<(), DeviceError> {
    match ready.recv() {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(DeviceError::unavailable(device, err)),
        Err(_) => Err(DeviceError::unavailable(
            device,
            "connection thread exited before connecting",
        )),
    }
}

fn spawn_named<F>(prefix: &str, device: &str, body: F) -> Result<JoinHandle<()>, DeviceError>
where
    F: FnOnce() + Send + 'static,
{
    let name = thread_name(prefix);
    thread::Builder::new()
        .name(name.clone())
        .spawn(body)
        .map_err(|err| {
            warn!(
                event = events::THREAD_SPAWN_FAILED,
                component = COMPONENT,
                device,
                thread = name.as_str(),
                err = %err,
                "failed to spawn connection thread"
            );
            DeviceError::unavailable(device, err)
        })
}

/// `prefix` plus eight hex digits; stays within the 15 byte limit of Linux thread names.
fn thread_name(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &id[..8])
}
