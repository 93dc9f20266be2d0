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
use crate::device::{NativeDevice, PortDirection};
use crate::observability::events;
use async_trait::async_trait;
use midi_muxer::{Device, Source, SourceError};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

const COMPONENT: &str = "native_source";

/// Inbound buffer size per input port, matching the usual native event queue.
pub const DEFAULT_INPUT_CAPACITY: usize = 1024;
pub const DEFAULT_OUTPUT_CAPACITY: usize = 64;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NativeSourceConfig {
    #[serde(default = "default_input_capacity")]
    pub input_capacity: usize,
    #[serde(default = "default_output_capacity")]
    pub output_capacity: usize,
}

impl Default for NativeSourceConfig {
    fn default() -> Self {
        Self {
            input_capacity: DEFAULT_INPUT_CAPACITY,
            output_capacity: DEFAULT_OUTPUT_CAPACITY,
        }
    }
}

fn default_input_capacity() -> usize {
    DEFAULT_INPUT_CAPACITY
}

fn default_output_capacity() -> usize {
    DEFAULT_OUTPUT_CAPACITY
}

///
/// [`NativeSource`] exposes every port a [`PortBackend`] enumerates as a
/// [`NativeDevice`].
///
/// Each [`Source::start`] enumerates afresh and replaces the previous devices.
/// [`Source::stop`] closes every device; they stay listed, and refuse new opens,
/// until the next start.
///
pub struct NativeSource {
    name: String,
    backend: Arc<dyn PortBackend>,
    config: NativeSourceConfig,
    devices: Mutex<Vec<Arc<NativeDevice>>>,
}

impl NativeSource {
    pub fn new(
        name: impl Into<String>,
        backend: Arc<dyn PortBackend>,
        config: NativeSourceConfig,
    ) -> Self {
        Self {
            name: name.into(),
            backend,
            config,
            devices: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &NativeSourceConfig {
        &self.config
    }

    /// Devices with their concrete type, for callers that need port details.
    pub fn native_devices(&self) -> Vec<Arc<NativeDevice>> {
        self.devices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn enumerate(&self) -> Result<Vec<Arc<NativeDevice>>, SourceError> {
        let inputs = self
            .backend
            .input_port_names()
            .map_err(|err| SourceError::start(&self.name, err))?;
        let outputs = self
            .backend
            .output_port_names()
            .map_err(|err| SourceError::start(&self.name, err))?;

        let tagged = inputs
            .into_iter()
            .enumerate()
            .map(|(index, name)| (PortId::new(index, name), PortDirection::Input))
            .chain(
                outputs
                    .into_iter()
                    .enumerate()
                    .map(|(index, name)| (PortId::new(index, name), PortDirection::Output)),
            );

        Ok(tagged
            .map(|(port, direction)| {
                Arc::new(NativeDevice::new(
                    port,
                    direction,
                    self.backend.clone(),
                    self.config.input_capacity,
                    self.config.output_capacity,
                ))
            })
            .collect())
    }

    fn close_all(devices: &[Arc<NativeDevice>]) -> Vec<String> {
        devices
            .iter()
            .filter_map(|device| {
                device.close().err().map(|_| {
                    warn!(
                        event = events::SOURCE_CLOSE,
                        component = COMPONENT,
                        device = device.name(),
                        "input connection thread panicked"
                    );
                    device.name().to_string()
                })
            })
            .collect()
    }
}

#[async_trait]
impl Source for NativeSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), SourceError> {
        let devices = match self.enumerate() {
            Ok(devices) => devices,
            Err(err) => {
                warn!(
                    event = events::SOURCE_ENUMERATE_FAILED,
                    component = COMPONENT,
                    source_name = self.name.as_str(),
                    err = %err,
                    "port enumeration failed"
                );
                return Err(err);
            }
        };

        let previous = std::mem::replace(
            &mut *self.devices.lock().unwrap_or_else(PoisonError::into_inner),
            devices,
        );
        Self::close_all(&previous);

        let devices = self.native_devices();
        info!(
            event = events::SOURCE_ENUMERATE_OK,
            component = COMPONENT,
            source_name = self.name.as_str(),
            inputs = devices.iter().filter(|device| device.is_input()).count(),
            outputs = devices.iter().filter(|device| device.is_output()).count(),
            "ports enumerated"
        );
        Ok(())
    }

    async fn stop(&self) -> Result<(), SourceError> {
        let devices = self.native_devices();
        let failed = Self::close_all(&devices);
        debug!(
            event = events::SOURCE_CLOSE,
            component = COMPONENT,
            source_name = self.name.as_str(),
            devices = devices.len(),
            "devices closed"
        );

        if failed.is_empty() {
            Ok(())
        } else {
            Err(SourceError::stop(
                &self.name,
                format!("connection threads panicked for {}", failed.join(", ")),
            ))
        }
    }

    fn devices(&self) -> Vec<Arc<dyn Device>> {
        self.native_devices()
            .into_iter()
            .map(|device| device as Arc<dyn Device>)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        NativeSource, NativeSourceConfig, DEFAULT_INPUT_CAPACITY, DEFAULT_OUTPUT_CAPACITY,
    };
    use crate::backend::PortBackend;
    use crate::device::PortDirection;
    use crate::loopback::LoopbackBackend;
    use midi_muxer::{DeviceError, Source};
    use std::sync::Arc;

    fn source(backend: &LoopbackBackend) -> NativeSource {
        let backend: Arc<dyn PortBackend> = Arc::new(backend.clone());
        NativeSource::new("loopback", backend, NativeSourceConfig::default())
    }

    #[test]
    fn config_defaults_match_reference_buffer() {
        let config = NativeSourceConfig::default();

        assert_eq!(config.input_capacity, DEFAULT_INPUT_CAPACITY);
        assert_eq!(config.output_capacity, DEFAULT_OUTPUT_CAPACITY);
    }

    #[tokio::test]
    async fn start_tags_ports_by_direction() {
        let backend = LoopbackBackend::new()
            .with_input("keys")
            .with_output("synth")
            .with_output("drums");
        let source = source(&backend);

        assert!(source.devices().is_empty());
        source.start().await.expect("loopback enumerates");

        let directions: Vec<(String, PortDirection)> = source
            .native_devices()
            .iter()
            .map(|device| (device.port().name.clone(), device.direction()))
            .collect();
        assert_eq!(
            directions,
            vec![
                ("keys".to_string(), PortDirection::Input),
                ("synth".to_string(), PortDirection::Output),
                ("drums".to_string(), PortDirection::Output),
            ]
        );
    }

    #[tokio::test]
    async fn stop_closes_devices_and_restart_replaces_them() {
        let backend = LoopbackBackend::new().with_input("keys");
        let source = source(&backend);
        source.start().await.expect("loopback enumerates");

        let before = source.devices().remove(0);
        let _receiver = before.incoming().expect("input connects");
        assert_eq!(backend.input_connections("keys"), 1);

        source.stop().await.expect("stop closes devices");
        assert_eq!(backend.input_connections("keys"), 0);
        assert_eq!(before.incoming().err(), Some(DeviceError::closed("keys")));

        source.start().await.expect("restart enumerates");
        let after = source.devices().remove(0);
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(after.incoming().is_ok());
        source.stop().await.expect("stop closes devices");
    }
}
