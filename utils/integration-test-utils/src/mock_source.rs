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

use crate::mock_device::MockDevice;
use async_trait::async_trait;
use midi_muxer::{Device, Source, SourceError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Failure switches for a [`MockSource`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MockSourceBehavior {
    pub fail_start: bool,
    pub fail_stop: bool,
}

/// [`Source`] over a fixed set of [`MockDevice`]s that records its lifecycle calls.
///
/// `stop` closes every device, which ends the inbound sequences dispatch workers
/// are reading.
pub struct MockSource {
    name: String,
    devices: Vec<Arc<MockDevice>>,
    behavior: Mutex<MockSourceBehavior>,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
}

impl MockSource {
    pub fn new(name: &str, devices: Vec<Arc<MockDevice>>) -> Arc<Self> {
        Self::with_behavior(name, devices, MockSourceBehavior::default())
    }

    pub fn with_behavior(
        name: &str,
        devices: Vec<Arc<MockDevice>>,
        behavior: MockSourceBehavior,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            devices,
            behavior: Mutex::new(behavior),
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
        })
    }

    pub fn set_behavior(&self, behavior: MockSourceBehavior) {
        *self.behavior.lock().unwrap_or_else(PoisonError::into_inner) = behavior;
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    fn behavior(&self) -> MockSourceBehavior {
        *self.behavior.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Source for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), SourceError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        debug!(source_name = self.name.as_str(), "mock source start");
        if self.behavior().fail_start {
            return Err(SourceError::start(&self.name, "mock configured to fail"));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), SourceError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        debug!(source_name = self.name.as_str(), "mock source stop");
        if self.behavior().fail_stop {
            return Err(SourceError::stop(&self.name, "mock configured to fail"));
        }
        for device in &self.devices {
            device.close();
        }
        Ok(())
    }

    fn devices(&self) -> Vec<Arc<dyn Device>> {
        self.devices
            .iter()
            .map(|device| device.clone() as Arc<dyn Device>)
            .collect()
    }
}
