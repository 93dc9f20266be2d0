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
use crossbeam_channel::{unbounded, Receiver, Sender};
use midi_muxer::Event;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;

struct LoopbackInput {
    name: String,
    listeners: Vec<(u64, broadcast::Sender<Event>)>,
}

struct LoopbackOutput {
    name: String,
    written_tx: Sender<Vec<u8>>,
    written_rx: Receiver<Vec<u8>>,
}

#[derive(Default)]
struct LoopbackState {
    inputs: Vec<LoopbackInput>,
    outputs: Vec<LoopbackOutput>,
    unavailable: HashSet<String>,
    next_listener: u64,
}

///
/// [`LoopbackBackend`] is an in-memory [`PortBackend`].
///
/// Input ports receive raw messages through [`LoopbackBackend::inject`]. Every
/// message written to an output port can be observed through
/// [`LoopbackBackend::monitor`]. Useful on hosts without a MIDI stack and for
/// exercising `NativeSource` end to end.
///
#[derive(Clone, Default)]
pub struct LoopbackBackend {
    state: Arc<Mutex<LoopbackState>>,
}

impl LoopbackBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(self, name: &str) -> Self {
        self.lock().inputs.push(LoopbackInput {
            name: name.to_string(),
            listeners: Vec::new(),
        });
        self
    }

    pub fn with_output(self, name: &str) -> Self {
        let (written_tx, written_rx) = unbounded();
        self.lock().outputs.push(LoopbackOutput {
            name: name.to_string(),
            written_tx,
            written_rx,
        });
        self
    }

    /// Makes every later connect to ports named `name` fail.
    pub fn set_unavailable(&self, name: &str, unavailable: bool) {
        let mut state = self.lock();
        if unavailable {
            state.unavailable.insert(name.to_string());
        } else {
            state.unavailable.remove(name);
        }
    }

    /// Feeds one raw message into every connection of input port `name`.
    /// Returns the number of connections that accepted it.
    pub fn inject(&self, name: &str, bytes: &[u8]) -> usize {
        let state = self.lock();
        state
            .inputs
            .iter()
            .filter(|input| input.name == name)
            .flat_map(|input| input.listeners.iter())
            .filter(|(_, sink)| deliver(name, sink, bytes))
            .count()
    }

    /// Open connections on input port `name`.
    pub fn input_connections(&self, name: &str) -> usize {
        self.lock()
            .inputs
            .iter()
            .filter(|input| input.name == name)
            .map(|input| input.listeners.len())
            .sum()
    }

    /// Messages written to output port `name`, in write order.
    pub fn monitor(&self, name: &str) -> Option<Receiver<Vec<u8>>> {
        self.lock()
            .outputs
            .iter()
            .find(|output| output.name == name)
            .map(|output| output.written_rx.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LoopbackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(state: &LoopbackState, port: &PortId) -> Result<(), BackendError> {
        if state.unavailable.contains(&port.name) {
            return Err(BackendError::Connect {
                port: port.clone(),
                reason: "port is unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl PortBackend for LoopbackBackend {
    fn input_port_names(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.lock().inputs.iter().map(|input| input.name.clone()).collect())
    }

    fn output_port_names(&self) -> Result<Vec<String>, BackendError> {
        Ok(self
            .lock()
            .outputs
            .iter()
            .map(|output| output.name.clone())
            .collect())
    }

    fn connect_input(
        &self,
        port: &PortId,
        sink: broadcast::Sender<Event>,
    ) -> Result<Box<dyn InputConnection>, BackendError> {
        let mut state = self.lock();
        Self::check_available(&state, port)?;
        let names: Vec<String> = state.inputs.iter().map(|input| input.name.clone()).collect();
        let index = resolve_index(port, &names)?;

        let id = state.next_listener;
        state.next_listener += 1;
        state.inputs[index].listeners.push((id, sink));

        Ok(Box::new(LoopbackInputConnection {
            state: self.state.clone(),
            index,
            id,
        }))
    }

    fn connect_output(&self, port: &PortId) -> Result<Box<dyn OutputConnection>, BackendError> {
        let state = self.lock();
        Self::check_available(&state, port)?;
        let names: Vec<String> = state
            .outputs
            .iter()
            .map(|output| output.name.clone())
            .collect();
        let index = resolve_index(port, &names)?;

        Ok(Box::new(LoopbackOutputConnection {
            port: port.clone(),
            written: state.outputs[index].written_tx.clone(),
        }))
    }
}

struct LoopbackInputConnection {
    state: Arc<Mutex<LoopbackState>>,
    index: usize,
    id: u64,
}

impl InputConnection for LoopbackInputConnection {}

impl Drop for LoopbackInputConnection {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(input) = state.inputs.get_mut(self.index) {
            input.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

struct LoopbackOutputConnection {
    port: PortId,
    written: Sender<Vec<u8>>,
}

impl OutputConnection for LoopbackOutputConnection {
    fn send(&mut self, bytes: &[u8]) -> Result<(), BackendError> {
        self.written
            .send(bytes.to_vec())
            .map_err(|err| BackendError::Send {
                port: self.port.clone(),
                reason: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::LoopbackBackend;
    use crate::backend::{BackendError, PortBackend, PortId};
    use midi_muxer::Event;
    use tokio::sync::broadcast;

    #[test]
    fn enumerates_ports_in_registration_order() {
        let backend = LoopbackBackend::new()
            .with_input("keys")
            .with_input("pads")
            .with_output("synth");

        assert_eq!(
            backend.input_port_names(),
            Ok(vec!["keys".to_string(), "pads".to_string()])
        );
        assert_eq!(backend.output_port_names(), Ok(vec!["synth".to_string()]));
    }

    #[test]
    fn injected_messages_reach_connected_inputs_until_dropped() {
        let backend = LoopbackBackend::new().with_input("keys");
        let (sink, mut receiver) = broadcast::channel(8);

        let connection = backend
            .connect_input(&PortId::new(0, "keys"), sink)
            .expect("port exists");
        assert_eq!(backend.inject("keys", &[0x90, 60, 100]), 1);
        assert_eq!(receiver.try_recv(), Ok(Event::new(0x90, 60, 100)));

        drop(connection);
        assert_eq!(backend.input_connections("keys"), 0);
        assert_eq!(backend.inject("keys", &[0x90, 60, 100]), 0);
    }

    #[test]
    fn output_writes_are_observable() {
        let backend = LoopbackBackend::new().with_output("synth");
        let monitor = backend.monitor("synth").expect("port exists");

        let mut connection = backend
            .connect_output(&PortId::new(0, "synth"))
            .expect("port exists");
        connection.send(&[0xC0, 7]).expect("monitor is alive");

        assert_eq!(monitor.try_recv(), Ok(vec![0xC0, 7]));
    }

    #[test]
    fn unavailable_ports_refuse_connections() {
        let backend = LoopbackBackend::new().with_output("synth");
        backend.set_unavailable("synth", true);

        assert!(matches!(
            backend.connect_output(&PortId::new(0, "synth")),
            Err(BackendError::Connect { .. })
        ));

        backend.set_unavailable("synth", false);
        assert!(backend.connect_output(&PortId::new(0, "synth")).is_ok());
    }
}
