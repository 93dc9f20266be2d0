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

//! Per-route event pipeline primitives.
//!
//! A route evaluates its [`Filter`]s in registration order and stops at the first
//! rejection. Accepted events are folded through the route's [`Transformer`]s in
//! registration order. Both families are open: implement the trait on a type, or
//! pass a closure, and hand it to [`with_filter`](crate::with_filter) or
//! [`with_transformer`](crate::with_transformer).
//!
//! ```
//! use midi_muxer::pipeline::{ChannelFilter, Filter, Transformer};
//! use midi_muxer::Event;
//!
//! let on_channel_one = ChannelFilter::new(1);
//! assert!(on_channel_one.accepts(Event::new(0x90, 60, 100)));
//! assert!(!on_channel_one.accepts(Event::new(0x91, 60, 100)));
//!
//! let transpose = |event: Event| Event::new(event.status, event.data1 + 12, event.data2);
//! assert_eq!(transpose.transform(Event::new(0x90, 60, 100)).data1, 72);
//! ```

mod filter;
mod transformer;

pub use filter::{ChannelFilter, Filter, NoteCondition, NoteFilter};
pub use transformer::{AftertouchToPitchBend, Transformer};
