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

//! # midi-muxer-native
//!
//! Hardware port [`Source`](midi_muxer::Source) for `midi-muxer`.
//!
//! [`NativeSource`] enumerates the input and output ports of a [`PortBackend`] and
//! exposes each one as a [`NativeDevice`]. Connections are opened lazily, the first
//! time the router asks for a device's inbound sequence or outbound sink, and each
//! lives on its own thread until the source stops.
//!
//! Backends:
//! - `MidirBackend`: the platform MIDI stack, behind the `midir` cargo feature
//! - [`LoopbackBackend`]: in-memory ports, always available
//!
//! ```
//! use std::sync::Arc;
//! use midi_muxer::{Router, Source};
//! use midi_muxer_native::{LoopbackBackend, NativeSource, NativeSourceConfig, PortBackend};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let backend: Arc<dyn PortBackend> =
//!     Arc::new(LoopbackBackend::new().with_input("keys").with_output("synth"));
//! let source: Arc<dyn Source> =
//!     Arc::new(NativeSource::new("loopback", backend, NativeSourceConfig::default()));
//!
//! let router = Router::new("native", vec![source]);
//! router.start().await.unwrap();
//! assert_eq!(router.inputs()[0].name(), "keys");
//! assert_eq!(router.outputs()[0].name(), "synth");
//! router.stop().await.unwrap();
//! # });
//! ```

mod backend;
pub use backend::{BackendError, InputConnection, OutputConnection, PortBackend, PortId};

mod device;
pub use device::{NativeDevice, PortDirection};

mod link;

mod loopback;
pub use loopback::LoopbackBackend;

#[cfg(feature = "midir")]
mod midir_backend;
#[cfg(feature = "midir")]
pub use midir_backend::{MidirBackend, DEFAULT_CLIENT_NAME};

mod observability;

mod source;
pub use source::{NativeSource, NativeSourceConfig, DEFAULT_INPUT_CAPACITY, DEFAULT_OUTPUT_CAPACITY};
