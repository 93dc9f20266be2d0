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

use crate::wiring::DeviceRole;
use midi_muxer::RouterError;
use midi_muxer_native::BackendError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MuxerError {
    #[error("unable to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        cause: io::Error,
    },
    #[error("unable to parse config: {reason}")]
    Parse { reason: String },
    #[error("invalid config: {reason}")]
    Invalid { reason: String },
    #[error("no {role} device matches `{name}`")]
    UnknownDevice { role: DeviceRole, name: String },
    #[error("{role} name `{name}` is ambiguous, candidates: {}", .candidates.join(", "))]
    AmbiguousDevice {
        role: DeviceRole,
        name: String,
        candidates: Vec<String>,
    },
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Router(#[from] RouterError),
    #[error("unable to wait for shutdown signal")]
    Signal(#[source] io::Error),
}

impl MuxerError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}
