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

use crate::device::Device;
use crate::event::Event;
use crate::pipeline::{Filter, Transformer};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

///
/// [`RouteOption`] configures one stage of a [`Route`] when it is registered with
/// [`Router::add_route`](crate::Router::add_route).
///
/// Options apply in the order they are passed: filters keep their relative order,
/// transformers keep theirs.
///
pub enum RouteOption {
    Filter(Box<dyn Filter>),
    Transformer(Box<dyn Transformer>),
}

impl Debug for RouteOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteOption::Filter(_) => f.write_str("RouteOption::Filter(..)"),
            RouteOption::Transformer(_) => f.write_str("RouteOption::Transformer(..)"),
        }
    }
}

/// Appends a filter to the route being registered.
pub fn with_filter(filter: impl Filter + 'static) -> RouteOption {
    RouteOption::Filter(Box::new(filter))
}

/// Appends a transformer to the route being registered.
pub fn with_transformer(transformer: impl Transformer + 'static) -> RouteOption {
    RouteOption::Transformer(Box::new(transformer))
}

///
/// [`Route`] is one output [`Device`] plus the ordered filter and transformer chains
/// applied to events on their way to it.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use midi_muxer::{with_filter, with_transformer, Device, DeviceError, Event, EventReceiver,
///     EventSender, Route};
///
/// # struct Synth;
/// #
/// # impl Device for Synth {
/// #     fn is_input(&self) -> bool { false }
/// #     fn is_output(&self) -> bool { true }
/// #     fn name(&self) -> &str { "synth" }
/// #     fn incoming(&self) -> Result<EventReceiver, DeviceError> {
/// #         Err(DeviceError::NotAnInput { device: "synth".to_string() })
/// #     }
/// #     fn outgoing(&self) -> Result<EventSender, DeviceError> {
/// #         unimplemented!("not needed for this doctest")
/// #     }
/// # }
/// let synth: Arc<dyn Device> = Arc::new(Synth);
/// let route = Route::new(
///     synth,
///     vec![
///         with_filter(|event: Event| event.status > 3),
///         with_transformer(|event: Event| Event::new(event.status + 1, event.data1, event.data2)),
///     ],
/// );
///
/// assert_eq!(route.process(Event::new(2, 0, 0)), None);
/// assert_eq!(route.process(Event::new(5, 0, 0)), Some(Event::new(6, 0, 0)));
/// ```
pub struct Route {
    output: Arc<dyn Device>,
    filters: Vec<Box<dyn Filter>>,
    transformers: Vec<Box<dyn Transformer>>,
}

impl Route {
    pub fn new(output: Arc<dyn Device>, options: impl IntoIterator<Item = RouteOption>) -> Self {
        let mut route = Self {
            output,
            filters: Vec::new(),
            transformers: Vec::new(),
        };
        for option in options {
            match option {
                RouteOption::Filter(filter) => route.filters.push(filter),
                RouteOption::Transformer(transformer) => route.transformers.push(transformer),
            }
        }
        route
    }

    pub fn output(&self) -> &Arc<dyn Device> {
        &self.output
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    pub fn transformer_count(&self) -> usize {
        self.transformers.len()
    }

    /// `true` iff every filter accepts the event. Stops at the first rejection.
    pub fn accepts(&self, event: Event) -> bool {
        self.filters.iter().all(|filter| filter.accepts(event))
    }

    /// Folds the transformer chain over a copy of `event`.
    pub fn transform(&self, event: Event) -> Event {
        self.transformers
            .iter()
            .fold(event, |event, transformer| transformer.transform(event))
    }

    /// Filters then transforms. `None` means the route drops the event.
    pub fn process(&self, event: Event) -> Option<Event> {
        self.accepts(event).then(|| self.transform(event))
    }
}

impl Debug for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("output", &self.output.name())
            .field("filters", &self.filters.len())
            .field("transformers", &self.transformers.len())
            .finish()
    }
}
