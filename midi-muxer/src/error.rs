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

//! Error types surfaced by devices, sources and the router facade.

use std::fmt::{Display, Formatter};
use std::io;
use thiserror::Error;

/// Failures when opening a device's inbound sequence or outbound sink.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DeviceError {
    #[error("device `{device}` is not an input")]
    NotAnInput { device: String },
    #[error("device `{device}` is not an output")]
    NotAnOutput { device: String },
    #[error("device `{device}` is unavailable: {reason}")]
    Unavailable { device: String, reason: String },
    #[error("device `{device}` is closed")]
    Closed { device: String },
}

impl DeviceError {
    pub fn unavailable(device: impl Into<String>, reason: impl Display) -> Self {
        Self::Unavailable {
            device: device.into(),
            reason: reason.to_string(),
        }
    }

    pub fn closed(device: impl Into<String>) -> Self {
        Self::Closed {
            device: device.into(),
        }
    }
}

/// Failures reported by a [`Source`](crate::Source) lifecycle transition.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SourceError {
    #[error("source `{source_name}` failed to start: {reason}")]
    Start { source_name: String, reason: String },
    #[error("source `{source_name}` failed to stop: {reason}")]
    Stop { source_name: String, reason: String },
}

impl SourceError {
    pub fn start(source_name: impl Into<String>, reason: impl Display) -> Self {
        Self::Start {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn stop(source_name: impl Into<String>, reason: impl Display) -> Self {
        Self::Stop {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn source_name(&self) -> &str {
        match self {
            Self::Start { source_name, .. } | Self::Stop { source_name, .. } => source_name,
        }
    }
}

/// Router lifecycle transition that produced a [`RouterError::Lifecycle`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LifecyclePhase {
    Start,
    Stop,
}

impl Display for LifecyclePhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecyclePhase::Start => write!(f, "start"),
            LifecyclePhase::Stop => write!(f, "stop"),
        }
    }
}

/// Failures returned by [`Router`](crate::Router) operations.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("failed to open inbound sequence of `{input}`")]
    OpenInput {
        input: String,
        #[source]
        cause: DeviceError,
    },
    #[error("failed to spawn dispatch worker for `{input}`")]
    SpawnWorker {
        input: String,
        #[source]
        cause: io::Error,
    },
    #[error("router {phase} failed for {} source(s): {}", .failures.len(), join_failures(.failures))]
    Lifecycle {
        phase: LifecyclePhase,
        failures: Vec<SourceError>,
    },
}

fn join_failures(failures: &[SourceError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
