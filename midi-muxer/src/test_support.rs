//! In-crate device double for unit tests.

use crate::device::{Device, EventReceiver, EventSender, InboundPort, OutboundPort};
use crate::error::DeviceError;
use crate::event::Event;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

const STUB_CAPACITY: usize = 16;

pub(crate) struct StubDevice {
    name: String,
    input: bool,
    output: bool,
    inbound: InboundPort,
    outbound: OutboundPort,
    drain: Mutex<Option<mpsc::Receiver<Event>>>,
    fail_open: AtomicBool,
    incoming_calls: AtomicUsize,
}

impl StubDevice {
    pub(crate) fn input(name: &str) -> Arc<Self> {
        Self::build(name, true, false, STUB_CAPACITY)
    }

    pub(crate) fn output(name: &str) -> Arc<Self> {
        Self::build(name, false, true, STUB_CAPACITY)
    }

    pub(crate) fn output_with_capacity(name: &str, capacity: usize) -> Arc<Self> {
        Self::build(name, false, true, capacity)
    }

    fn build(name: &str, input: bool, output: bool, capacity: usize) -> Arc<Self> {
        let outbound = OutboundPort::new(capacity);
        let mut drain = None;
        if output {
            outbound
                .open_with(name, |receiver| {
                    drain = Some(receiver);
                    Ok(())
                })
                .expect("stub outbound port should open");
        }

        Arc::new(Self {
            name: name.to_string(),
            input,
            output,
            inbound: InboundPort::new(STUB_CAPACITY),
            outbound,
            drain: Mutex::new(drain),
            fail_open: AtomicBool::new(false),
            incoming_calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn emit(&self, event: Event) {
        if let Some(sender) = self.inbound.sender() {
            let _ = sender.send(event);
        }
    }

    pub(crate) async fn recv_forwarded(&self, wait: Duration) -> Option<Event> {
        let mut drain = self.drain.lock().await;
        let receiver = drain.as_mut()?;
        tokio::time::timeout(wait, receiver.recv())
            .await
            .ok()
            .flatten()
    }

    pub(crate) fn set_fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn incoming_calls(&self) -> usize {
        self.incoming_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn close(&self) {
        self.inbound.close();
        self.outbound.close();
    }
}

impl Device for StubDevice {
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
                Err(DeviceError::unavailable(&self.name, "stub open failure"))
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
