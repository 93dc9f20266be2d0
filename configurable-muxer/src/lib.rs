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

//! Library half of the `configurable-muxer` binary: the json5 config model,
//! device-name resolution and route wiring.

mod config;
pub use config::{Config, FilterConfig, RouteConfig, TransformerConfig, DEFAULT_CLIENT_NAME};

mod error;
pub use error::MuxerError;

mod wiring;
pub use wiring::{apply_routes, port_listing, resolve_device, DeviceRole};
