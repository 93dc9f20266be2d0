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

use midi_muxer::{Device, DeviceError, Event, EventReceiver, EventSender, InboundPort, OutboundPort};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

pub const DEFAULT_MOCK_CAPACITY: usize = 64;

/// In-memory [`Device`] whose inbound events are injected by the test and whose
/// forwarded events are collected for assertions.
pub struct MockDevice {
    name: String,
    input: bool,
    output: bool,
    inbound: InboundPort,
    outbound: OutboundPort,
    drain: Mutex<Option<mpsc::Receiver<Event>>>,
    fail_open: AtomicBool,
    incoming_calls: AtomicUsize,
}

impl MockDevice {
    pub fn input(name: &str) -> Arc<Self> {
        Self::build(name, true, false, DEFAULT_MOCK_CAPACITY)
    }

    pub fn output(name: &str) -> Arc<Self> {
        Self::build(name, false, true, DEFAULT_MOCK_CAPACITY)
    }

    pub fn duplex(name: &str) -> Arc<Self> {
        Self::build(name, true, true, DEFAULT_MOCK_CAPACITY)
    }

    /// Output whose sink holds at most `capacity` undrained events.
    pub fn output_with_capacity(name: &str, capacity: usize) -> Arc<Self> {
        Self::build(name, false, true, capacity)
    }

    fn build(name: &str, input: bool, output: bool, capacity: usize) -> Arc<Self> {
        let outbound = OutboundPort::new(capacity);
        let mut drain = None;
        if output {
            // The drain side is kept by the mock, so opening cannot fail here.
            let _ = outbound.open_with(name, |receiver| {
                drain = Some(receiver);
                Ok(())
            });
        }

        Arc::new(Self {
            name: name.to_string(),
            input,
            output,
            inbound: InboundPort::new(DEFAULT_MOCK_CAPACITY),
            outbound,
            drain: Mutex::new(drain),
            fail_open: AtomicBool::new(false),
            incoming_calls: AtomicUsize::new(0),
        })
    }

    /// Injects an event into the inbound sequence. Returns `false` when nothing
    /// is subscribed.
    pub fn emit(&self, event: Event) -> bool {
        let delivered = self
            .inbound
            .sender()
            .map(|sender| sender.send(event).is_ok())
            .unwrap_or(false);
        debug!(device = self.name.as_str(), %event, delivered, "mock emit");
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.inbound
            .sender()
            .map_or(0, |sender| sender.receiver_count())
    }

    /// Next event forwarded to this output, or `None` after `wait`.
    pub async fn recv_forwarded(&self, wait: Duration) -> Option<Event> {
        let mut drain = self.drain.lock().await;
        let receiver = drain.as_mut()?;
        tokio::time::timeout(wait, receiver.recv())
            .await
            .ok()
            .flatten()
    }

    /// Every event forwarded until `wait` passes without a new one.
    pub async fn drain_forwarded(&self, wait: Duration) -> Vec<Event> {
        let mut forwarded = Vec::new();
        while let Some(event) = self.recv_forwarded(wait).await {
            forwarded.push(event);
        }
        forwarded
    }

    /// Makes the next inbound open fail with [`DeviceError::Unavailable`].
    pub fn set_fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    pub fn incoming_calls(&self) -> usize {
        self.incoming_calls.load(Ordering::SeqCst)
    }

    /// Ends the inbound sequence and refuses further opens.
    pub fn close(&self) {
        self.inbound.close();
        self.outbound.close();
    }
}

impl Device for MockDevice {
    fn is_input(&self) -> bool {
        self.input
    }

    fn is_output(&self) -> bool {
        self.output
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn incoming(&self) -> Result<EventReceiver, DeviceError> {
        if !self.input {
            return Err(DeviceError::NotAnInput {
                device: self.name.clone(),
            });
        }
        self.incoming_calls.fetch_add(1, Ordering::SeqCst);
        self.inbound.open_with(&self.name, |_| {
            if self.fail_open.load(Ordering::SeqCst) {
                Err(DeviceError::unavailable(&self.name, "mock configured to fail"))
            } else {
                Ok(())
            }
        })
    }

    fn outgoing(&self) -> Result<EventSender, DeviceError> {
        if !self.output {
            return Err(DeviceError::NotAnOutput {
                device: self.name.clone(),
            });
        }
        self.outbound
            .open_with(&self.name, |_| Err(DeviceError::closed(&self.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::MockDevice;
    use midi_muxer::{Device, DeviceError, Event};
    use std::time::Duration;

    #[tokio::test]
    async fn emit_reaches_subscribers_only_after_open() {
        let keys = MockDevice::input("keys");

        assert!(!keys.emit(Event::new(0x90, 60, 100)));

        let mut receiver = keys.incoming().expect("input should open");
        assert_eq!(keys.subscriber_count(), 1);
        assert!(keys.emit(Event::new(0x90, 60, 100)));
        assert_eq!(receiver.recv().await, Ok(Event::new(0x90, 60, 100)));
    }

    #[tokio::test]
    async fn outgoing_events_are_collected() {
        let synth = MockDevice::output("synth");
        let sink = synth.outgoing().expect("output should open");

        sink.send(Event::new(0xB0, 7, 100)).await.expect("drain alive");
        sink.send(Event::new(0xB0, 7, 90)).await.expect("drain alive");

        assert_eq!(
            synth.drain_forwarded(Duration::from_millis(50)).await,
            vec![Event::new(0xB0, 7, 100), Event::new(0xB0, 7, 90)]
        );
    }

    #[test]
    fn capability_errors_name_the_device() {
        let synth = MockDevice::output("synth");
        let keys = MockDevice::input("keys");

        assert_eq!(
            synth.incoming().err(),
            Some(DeviceError::NotAnInput {
                device: "synth".to_string()
            })
        );
        assert_eq!(
            keys.outgoing().err(),
            Some(DeviceError::NotAnOutput {
                device: "keys".to_string()
            })
        );
    }
}
