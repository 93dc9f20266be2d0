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

use crate::backend::{PortBackend, PortId};
use crate::link::{spawn_writer, InputLink};
use midi_muxer::{Device, DeviceError, EventReceiver, EventSender, InboundPort, OutboundPort};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PortDirection {
    Input,
    Output,
}

///
/// [`NativeDevice`] is one enumerated native port.
///
/// Its inbound sequence or outbound sink connects on first use; the connection
/// then lives on a dedicated thread until [`NativeDevice::close`].
///
pub struct NativeDevice {
    port: PortId,
    direction: PortDirection,
    backend: Arc<dyn PortBackend>,
    inbound: InboundPort,
    outbound: OutboundPort,
    input_link: Mutex<Option<InputLink>>,
}

impl NativeDevice {
    pub(crate) fn new(
        port: PortId,
        direction: PortDirection,
        backend: Arc<dyn PortBackend>,
        input_capacity: usize,
        output_capacity: usize,
    ) -> Self {
        Self {
            port,
            direction,
            backend,
            inbound: InboundPort::new(input_capacity),
            outbound: OutboundPort::new(output_capacity),
            input_link: Mutex::new(None),
        }
    }

    pub fn port(&self) -> &PortId {
        &self.port
    }

    pub fn direction(&self) -> PortDirection {
        self.direction
    }

    /// Disconnects the port and refuses later opens.
    ///
    /// Ends every inbound subscriber's sequence. The output writer finishes once
    /// the sinks already handed out are dropped.
    pub fn close(&self) -> thread::Result<()> {
        self.inbound.close();
        self.outbound.close();
        let link = self
            .input_link
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match link {
            Some(link) => link.disconnect(),
            None => Ok(()),
        }
    }
}

impl Device for NativeDevice {
    fn is_input(&self) -> bool {
        self.direction == PortDirection::Input
    }

    fn is_output(&self) -> bool {
        self.direction == PortDirection::Output
    }

    fn name(&self) -> &str {
        &self.port.name
    }

    fn incoming(&self) -> Result<EventReceiver, DeviceError> {
        if !self.is_input() {
            return Err(DeviceError::NotAnInput {
                device: self.port.name.clone(),
            });
        }
        self.inbound.open_with(&self.port.name, |sink| {
            let link = InputLink::connect(self.backend.clone(), self.port.clone(), sink)?;
            *self
                .input_link
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(link);
            Ok(())
        })
    }

    fn outgoing(&self) -> Result<EventSender, DeviceError> {
        if !self.is_output() {
            return Err(DeviceError::NotAnOutput {
                device: self.port.name.clone(),
            });
        }
        self.outbound.open_with(&self.port.name, |receiver| {
            spawn_writer(self.backend.clone(), self.port.clone(), receiver)
        })
    }
}
