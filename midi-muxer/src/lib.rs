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

//! # midi-muxer
//!
//! `midi-muxer` routes three-byte MIDI control events from input devices to output
//! devices. Every route carries an ordered chain of filters and an ordered chain of
//! transformers applied before the event is forwarded.
//!
//! Typical usage is centered on [`Router`], the [`Device`] and [`Source`] contracts,
//! and the [`with_filter`] / [`with_transformer`] route options.
//!
//! ## Route contract
//!
//! Filters run in registration order and the first rejection drops the event for
//! that route. Transformers then fold over the route's own copy of the event. One
//! input routed to several outputs delivers to each of them independently.
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use midi_muxer::{with_filter, with_transformer, Device, DeviceError, Event, EventReceiver,
//!     EventSender, InboundPort, OutboundPort, Router, Source, SourceError};
//! use tokio::sync::mpsc;
//!
//! # struct Port {
//! #     name: &'static str,
//! #     inbound: InboundPort,
//! #     outbound: OutboundPort,
//! #     drain: std::sync::Mutex<Option<mpsc::Receiver<Event>>>,
//! # }
//! #
//! # impl Port {
//! #     fn new(name: &'static str) -> Arc<Self> {
//! #         Arc::new(Self {
//! #             name,
//! #             inbound: InboundPort::new(16),
//! #             outbound: OutboundPort::new(16),
//! #             drain: std::sync::Mutex::new(None),
//! #         })
//! #     }
//! # }
//! #
//! # impl Device for Port {
//! #     fn is_input(&self) -> bool { true }
//! #     fn is_output(&self) -> bool { true }
//! #     fn name(&self) -> &str { self.name }
//! #     fn incoming(&self) -> Result<EventReceiver, DeviceError> {
//! #         self.inbound.open_with(self.name, |_| Ok(()))
//! #     }
//! #     fn outgoing(&self) -> Result<EventSender, DeviceError> {
//! #         self.outbound.open_with(self.name, |receiver| {
//! #             *self.drain.lock().unwrap() = Some(receiver);
//! #             Ok(())
//! #         })
//! #     }
//! # }
//! #
//! # struct Ports(Vec<Arc<Port>>);
//! #
//! # #[async_trait]
//! # impl Source for Ports {
//! #     fn name(&self) -> &str { "ports" }
//! #     async fn start(&self) -> Result<(), SourceError> { Ok(()) }
//! #     async fn stop(&self) -> Result<(), SourceError> { Ok(()) }
//! #     fn devices(&self) -> Vec<Arc<dyn Device>> {
//! #         self.0.iter().map(|port| port.clone() as Arc<dyn Device>).collect()
//! #     }
//! # }
//! #
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! # let keys = Port::new("keys");
//! # let synth = Port::new("synth");
//! # let source: Arc<dyn Source> = Arc::new(Ports(vec![keys.clone(), synth.clone()]));
//! let router = Router::new("contract", vec![source]);
//! router.start().await.unwrap();
//!
//! let input: Arc<dyn Device> = keys.clone();
//! let output: Arc<dyn Device> = synth.clone();
//! router
//!     .add_route(
//!         input,
//!         output,
//!         vec![
//!             with_filter(|event: Event| event.status > 3),
//!             with_filter(|event: Event| event.status % 2 == 1),
//!             with_transformer(|event: Event| Event::new(event.status + 1, 0, 0)),
//!             with_transformer(|event: Event| Event::new(event.status / 2, 0, 0)),
//!         ],
//!     )
//!     .await
//!     .unwrap();
//!
//! let inbound = keys.inbound.sender().unwrap();
//! inbound.send(Event::new(2, 0, 0)).unwrap();
//! inbound.send(Event::new(5, 0, 0)).unwrap();
//!
//! let mut drain = synth.drain.lock().unwrap().take().unwrap();
//! let forwarded = tokio::time::timeout(Duration::from_secs(2), drain.recv()).await;
//! assert_eq!(forwarded.unwrap(), Some(Event::new(3, 0, 0)));
//! router.stop().await.unwrap();
//! # });
//! ```
//!
//! ## Internal architecture map
//!
//! - API facade: [`Router`], [`Route`] and the route options
//! - Pipeline: [`pipeline`] filters and transformers
//! - Device contracts: [`Device`], [`Source`] and the [`InboundPort`] / [`OutboundPort`]
//!   helpers adapters build on
//! - Control plane: input -> routes registry and the first-route open transition
//! - Data plane: per-input dispatch workers and the shared stop signal
//! - Runtime: dedicated thread and current-thread runtime per dispatch worker
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events.
//! Library code emits events and does not unconditionally initialize a global
//! subscriber. Binaries and tests are responsible for one-time `tracing_subscriber`
//! initialization at process boundaries.

mod config;
pub use config::{LifecyclePolicy, RouterConfig, DEFAULT_ROUTER_NAME};

mod control_plane;
mod data_plane;

mod device;
pub use device::{Device, EventReceiver, EventSender, InboundPort, OutboundPort, Source};

mod error;
pub use error::{DeviceError, LifecyclePhase, RouterError, SourceError};

mod event;
pub use event::{Event, SYSTEM_STATUS};

#[doc(hidden)]
pub mod observability;
pub mod pipeline;
pub use pipeline::{
    AftertouchToPitchBend, ChannelFilter, Filter, NoteCondition, NoteFilter, Transformer,
};

mod route;
pub use route::{with_filter, with_transformer, Route, RouteOption};

mod router;
pub use router::Router;

mod runtime;

#[cfg(test)]
mod test_support;
