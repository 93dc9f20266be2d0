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

//! Device and source capability contracts.
//!
//! A [`Device`] is one endpoint that can produce events (input), accept events
//! (output) or both. A [`Source`] owns a family of devices and controls their
//! native resources. The router only talks to hardware through these two traits.
//!
//! [`InboundPort`] and [`OutboundPort`] hold the lazily opened channel state most
//! device implementations need, so adapters only supply the native open step.

use crate::error::{DeviceError, SourceError};
use crate::event::Event;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{broadcast, mpsc};

/// Inbound event sequence handed out by [`Device::incoming`].
pub type EventReceiver = broadcast::Receiver<Event>;

/// Outbound event sink handed out by [`Device::outgoing`].
pub type EventSender = mpsc::Sender<Event>;

/// Capability contract for one event endpoint.
///
/// Identity is the identity of the `Arc<dyn Device>` the owning [`Source`] hands
/// out: two handles refer to the same device iff they point at the same allocation.
pub trait Device: Send + Sync {
    fn is_input(&self) -> bool;

    fn is_output(&self) -> bool;

    fn name(&self) -> &str;

    /// Subscribes to the device's inbound sequence, opening it on first use.
    ///
    /// Every call returns a receiver on the same underlying channel. Fails with
    /// [`DeviceError::NotAnInput`] for output-only devices.
    ///
    /// The router calls this on tokio's blocking pool, so a native open may wait on
    /// a driver thread. It must still return in bounded time: registrations for
    /// every input queue behind it.
    fn incoming(&self) -> Result<EventReceiver, DeviceError>;

    /// Returns the device's outbound sink, opening it on first use.
    ///
    /// Every call returns a clone of the same bounded sender. Fails with
    /// [`DeviceError::NotAnOutput`] for input-only devices.
    fn outgoing(&self) -> Result<EventSender, DeviceError>;
}

/// Lifecycle and enumeration contract for a family of devices.
#[async_trait]
pub trait Source: Send + Sync {
    fn name(&self) -> &str;

    /// Enumerates devices and acquires whatever native context they need.
    async fn start(&self) -> Result<(), SourceError>;

    /// Releases every resource acquired by [`Source::start`] and closes every
    /// sequence or sink opened through this source's devices.
    async fn stop(&self) -> Result<(), SourceError>;

    /// Devices enumerated by the last successful start.
    fn devices(&self) -> Vec<Arc<dyn Device>>;
}

enum PortState<T> {
    Idle,
    Open(T),
    Closed,
}

///
/// Lazily opened broadcast channel backing a device's inbound sequence.
///
/// The first [`InboundPort::open_with`] creates the channel and hands the sender to
/// the caller's native open step. Later calls subscribe to the existing channel.
/// After [`InboundPort::close`] the sender is dropped, which ends every
/// subscriber's sequence, and further opens fail with [`DeviceError::Closed`].
///
pub struct InboundPort {
    capacity: usize,
    state: Mutex<PortState<broadcast::Sender<Event>>>,
}

impl InboundPort {
    /// Creates an idle port. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(PortState::Idle),
        }
    }

    pub fn open_with<F>(&self, device: &str, open: F) -> Result<EventReceiver, DeviceError>
    where
        F: FnOnce(broadcast::Sender<Event>) -> Result<(), DeviceError>,
    {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            PortState::Open(sender) => Ok(sender.subscribe()),
            PortState::Closed => Err(DeviceError::closed(device)),
            PortState::Idle => {
                let (sender, receiver) = broadcast::channel(self.capacity);
                open(sender.clone())?;
                *state = PortState::Open(sender);
                Ok(receiver)
            }
        }
    }

    /// Sender of the open channel, if any.
    pub fn sender(&self) -> Option<broadcast::Sender<Event>> {
        match &*self.state.lock().unwrap_or_else(PoisonError::into_inner) {
            PortState::Open(sender) => Some(sender.clone()),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(
            &*self.state.lock().unwrap_or_else(PoisonError::into_inner),
            PortState::Open(_)
        )
    }

    /// Drops the channel and refuses later opens.
    pub fn close(&self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = PortState::Closed;
    }
}

///
/// Lazily opened bounded channel backing a device's outbound sink.
///
/// The first [`OutboundPort::open_with`] creates the channel and hands the receiver
/// to the caller's native open step, typically a writer that drains it. Later
/// calls clone the existing sender. [`OutboundPort::close`] drops the port's
/// sender; the writer ends once every clone handed out has been dropped too.
///
pub struct OutboundPort {
    capacity: usize,
    state: Mutex<PortState<mpsc::Sender<Event>>>,
}

impl OutboundPort {
    /// Creates an idle port. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(PortState::Idle),
        }
    }

    pub fn open_with<F>(&self, device: &str, open: F) -> Result<EventSender, DeviceError>
    where
        F: FnOnce(mpsc::Receiver<Event>) -> Result<(), DeviceError>,
    {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            PortState::Open(sender) => Ok(sender.clone()),
            PortState::Closed => Err(DeviceError::closed(device)),
            PortState::Idle => {
                let (sender, receiver) = mpsc::channel(self.capacity);
                open(receiver)?;
                *state = PortState::Open(sender.clone());
                Ok(sender)
            }
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(
            &*self.state.lock().unwrap_or_else(PoisonError::into_inner),
            PortState::Open(_)
        )
    }

    /// Drops the port's sender and refuses later opens.
    pub fn close(&self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = PortState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::{InboundPort, OutboundPort};
    use crate::error::DeviceError;
    use crate::event::Event;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::broadcast::error::RecvError;

    #[tokio::test]
    async fn inbound_port_opens_native_endpoint_once() {
        let port = InboundPort::new(8);
        let opens = AtomicUsize::new(0);

        let mut first = port
            .open_with("keys", |_| {
                opens.fetch_add(1, Ordering::Relaxed);
                Ok(())
            })
            .expect("first open should succeed");
        let mut second = port
            .open_with("keys", |_| {
                opens.fetch_add(1, Ordering::Relaxed);
                Ok(())
            })
            .expect("second open should subscribe");

        assert_eq!(opens.load(Ordering::Relaxed), 1);
        let sender = port.sender().expect("port should be open");
        sender
            .send(Event::new(0x90, 60, 100))
            .expect("both receivers are alive");

        assert_eq!(first.recv().await, Ok(Event::new(0x90, 60, 100)));
        assert_eq!(second.recv().await, Ok(Event::new(0x90, 60, 100)));
    }

    #[tokio::test]
    async fn inbound_port_stays_idle_when_native_open_fails() {
        let port = InboundPort::new(8);

        let result = port.open_with("keys", |_| Err(DeviceError::unavailable("keys", "busy")));

        assert_eq!(
            result.err(),
            Some(DeviceError::unavailable("keys", "busy"))
        );
        assert!(!port.is_open());
        assert!(port.open_with("keys", |_| Ok(())).is_ok());
    }

    #[tokio::test]
    async fn inbound_port_close_ends_subscribers_and_refuses_reopen() {
        let port = InboundPort::new(8);
        let mut receiver = port
            .open_with("keys", |_| Ok(()))
            .expect("open should succeed");

        port.close();

        assert_eq!(receiver.recv().await, Err(RecvError::Closed));
        assert_eq!(
            port.open_with("keys", |_| Ok(())).err(),
            Some(DeviceError::closed("keys"))
        );
    }

    #[tokio::test]
    async fn outbound_port_hands_out_one_sink() {
        let port = OutboundPort::new(0);
        let mut drained = None;

        let first = port
            .open_with("synth", |receiver| {
                drained = Some(receiver);
                Ok(())
            })
            .expect("first open should succeed");
        let second = port
            .open_with("synth", |_| panic!("native open must not run twice"))
            .expect("second open should clone");

        assert!(first.same_channel(&second));
        let mut receiver = drained.expect("open step should receive the drain side");
        first
            .send(Event::new(0xB0, 7, 127))
            .await
            .expect("receiver is alive");
        assert_eq!(receiver.recv().await, Some(Event::new(0xB0, 7, 127)));

        port.close();
        drop(first);
        drop(second);
        assert_eq!(receiver.recv().await, None);
        assert!(!port.is_open());
    }
}
