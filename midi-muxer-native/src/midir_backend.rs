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

use crate::backend::{
    deliver, resolve_index, BackendError, InputConnection, OutputConnection, PortBackend, PortId,
};
use midi_muxer::Event;
use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use tokio::sync::broadcast;

pub const DEFAULT_CLIENT_NAME: &str = "midi-muxer";

/// [`PortBackend`] over the platform MIDI stack through `midir`.
///
/// A fresh client is created for every enumeration and connection, so the backend
/// itself holds no native state.
#[derive(Clone, Debug)]
pub struct MidirBackend {
    client_name: String,
}

impl MidirBackend {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
        }
    }

    fn input_client(&self) -> Result<MidiInput, BackendError> {
        MidiInput::new(&self.client_name).map_err(|err| BackendError::Init {
            reason: err.to_string(),
        })
    }

    fn output_client(&self) -> Result<MidiOutput, BackendError> {
        MidiOutput::new(&self.client_name).map_err(|err| BackendError::Init {
            reason: err.to_string(),
        })
    }
}

impl Default for MidirBackend {
    fn default() -> Self {
        Self::new(DEFAULT_CLIENT_NAME)
    }
}

impl PortBackend for MidirBackend {
    fn input_port_names(&self) -> Result<Vec<String>, BackendError> {
        let client = self.input_client()?;
        client
            .ports()
            .iter()
            .map(|port| client.port_name(port))
            .collect::<Result<_, _>>()
            .map_err(|err| BackendError::Enumerate {
                reason: err.to_string(),
            })
    }

    fn output_port_names(&self) -> Result<Vec<String>, BackendError> {
        let client = self.output_client()?;
        client
            .ports()
            .iter()
            .map(|port| client.port_name(port))
            .collect::<Result<_, _>>()
            .map_err(|err| BackendError::Enumerate {
                reason: err.to_string(),
            })
    }

    fn connect_input(
        &self,
        port: &PortId,
        sink: broadcast::Sender<Event>,
    ) -> Result<Box<dyn InputConnection>, BackendError> {
        let client = self.input_client()?;
        let ports = client.ports();
        let names = self.input_port_names()?;
        let native_port = ports
            .get(resolve_index(port, &names)?)
            .ok_or_else(|| BackendError::PortNotFound { port: port.clone() })?;

        let name = port.name.clone();
        let connection = client
            .connect(
                native_port,
                &self.client_name,
                move |_stamp, message, _| {
                    deliver(&name, &sink, message);
                },
                (),
            )
            .map_err(|err| BackendError::Connect {
                port: port.clone(),
                reason: err.to_string(),
            })?;
        Ok(Box::new(connection))
    }

    fn connect_output(&self, port: &PortId) -> Result<Box<dyn OutputConnection>, BackendError> {
        let client = self.output_client()?;
        let ports = client.ports();
        let names = self.output_port_names()?;
        let native_port = ports
            .get(resolve_index(port, &names)?)
            .ok_or_else(|| BackendError::PortNotFound { port: port.clone() })?;

        let connection = client
            .connect(native_port, &self.client_name)
            .map_err(|err| BackendError::Connect {
                port: port.clone(),
                reason: err.to_string(),
            })?;
        Ok(Box::new(MidirOutput {
            port: port.clone(),
            connection,
        }))
    }
}

impl InputConnection for MidiInputConnection<()> {}

struct MidirOutput {
    port: PortId,
    connection: MidiOutputConnection,
}

impl OutputConnection for MidirOutput {
    fn send(&mut self, bytes: &[u8]) -> Result<(), BackendError> {
        self.connection
            .send(bytes)
            .map_err(|err| BackendError::Send {
                port: self.port.clone(),
                reason: err.to_string(),
            })
    }
}
