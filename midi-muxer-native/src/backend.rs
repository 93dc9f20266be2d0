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

//! Port access contract implemented by native MIDI bindings.

use crate::observability::events;
use midi_muxer::Event;
use std::fmt::{Display, Formatter};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::trace;

const COMPONENT: &str = "port_backend";

/// Failures reported by a [`PortBackend`].
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum BackendError {
    #[error("failed to initialize MIDI client: {reason}")]
    Init { reason: String },
    #[error("failed to enumerate ports: {reason}")]
    Enumerate { reason: String },
    #[error("port {port} not found")]
    PortNotFound { port: PortId },
    #[error("failed to connect port {port}: {reason}")]
    Connect { port: PortId, reason: String },
    #[error("failed to write to port {port}: {reason}")]
    Send { port: PortId, reason: String },
}

/// Position and name of one native port as enumerated by the backend.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PortId {
    pub index: usize,
    pub name: String,
}

impl PortId {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

impl Display for PortId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} `{}`", self.index, self.name)
    }
}

/// Open input connection. Dropping it disconnects the port.
pub trait InputConnection {}

/// Open output connection.
pub trait OutputConnection {
    /// Writes one raw message to the port.
    fn send(&mut self, bytes: &[u8]) -> Result<(), BackendError>;
}

///
/// [`PortBackend`] enumerates and connects native ports.
///
/// Connections are created and dropped on the thread that owns them, so they do
/// not need to be `Send`; the backend itself is shared between devices.
///
pub trait PortBackend: Send + Sync + 'static {
    fn input_port_names(&self) -> Result<Vec<String>, BackendError>;

    fn output_port_names(&self) -> Result<Vec<String>, BackendError>;

    /// Connects an input port. Every raw message it receives is delivered to `sink`
    /// until the returned connection is dropped.
    fn connect_input(
        &self,
        port: &PortId,
        sink: broadcast::Sender<Event>,
    ) -> Result<Box<dyn InputConnection>, BackendError>;

    fn connect_output(&self, port: &PortId) -> Result<Box<dyn OutputConnection>, BackendError>;
}

/// Converts one raw message and publishes it to `sink`.
///
/// Empty messages are skipped. A send without subscribers is not an error: the
/// router may not have routed this input yet.
pub fn deliver(port: &str, sink: &broadcast::Sender<Event>, bytes: &[u8]) -> bool {
    let Some(event) = Event::from_bytes(bytes) else {
        trace!(
            event = events::INPUT_MESSAGE_EMPTY,
            component = COMPONENT,
            port,
            "skipping empty message"
        );
        return false;
    };
    sink.send(event).is_ok()
}

/// Resolves `port` among enumerated `names`: the name at the recorded index wins,
/// otherwise the first port with that name.
pub fn resolve_index(port: &PortId, names: &[String]) -> Result<usize, BackendError> {
    if names.get(port.index) == Some(&port.name) {
        return Ok(port.index);
    }
    names
        .iter()
        .position(|name| name == &port.name)
        .ok_or_else(|| BackendError::PortNotFound { port: port.clone() })
}
