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

use crate::config::RouteConfig;
use crate::error::MuxerError;
use midi_muxer::{Device, Router};
use midi_muxer_native::PortBackend;
use std::fmt::{Display, Formatter, Write};
use std::sync::Arc;
use tracing::{info, warn};

const COMPONENT: &str = "configurable_muxer";
const ROUTE_APPLY_OK: &str = "route_apply_ok";
const ROUTE_APPLY_FAILED: &str = "route_apply_failed";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeviceRole {
    Input,
    Output,
}

impl Display for DeviceRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceRole::Input => write!(f, "input"),
            DeviceRole::Output => write!(f, "output"),
        }
    }
}

/// Picks the device `name` refers to.
///
/// An exact name wins. Otherwise `name` must be a case-insensitive substring of
/// exactly one device name.
pub fn resolve_device(
    devices: &[Arc<dyn Device>],
    name: &str,
    role: DeviceRole,
) -> Result<Arc<dyn Device>, MuxerError> {
    if let Some(device) = devices.iter().find(|device| device.name() == name) {
        return Ok(device.clone());
    }

    let needle = name.to_lowercase();
    let mut matches = devices
        .iter()
        .filter(|device| device.name().to_lowercase().contains(&needle));
    match (matches.next(), matches.next()) {
        (Some(device), None) => Ok(device.clone()),
        (None, _) => Err(MuxerError::UnknownDevice {
            role,
            name: name.to_string(),
        }),
        (Some(first), Some(second)) => {
            let candidates = [first, second]
                .into_iter()
                .chain(matches)
                .map(|device| device.name().to_string())
                .collect();
            Err(MuxerError::AmbiguousDevice {
                role,
                name: name.to_string(),
                candidates,
            })
        }
    }
}

/// Registers every configured route on a started router.
///
/// All names are resolved before the first route is added, so a typo leaves the
/// router untouched.
pub async fn apply_routes(router: &Router, routes: &[RouteConfig]) -> Result<usize, MuxerError> {
    let inputs = router.inputs();
    let outputs = router.outputs();

    let resolved = routes
        .iter()
        .map(|route| -> Result<_, MuxerError> {
            Ok((
                resolve_device(&inputs, &route.input, DeviceRole::Input)?,
                resolve_device(&outputs, &route.output, DeviceRole::Output)?,
                route,
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (input, output, route) in resolved {
        let label = format!("{}->{}", input.name(), output.name());
        match router.add_route(input, output, route.options()).await {
            Ok(()) => info!(
                event = ROUTE_APPLY_OK,
                component = COMPONENT,
                route_label = label.as_str(),
                filters = route.filters.len(),
                transformers = route.transformers.len(),
                "route applied"
            ),
            Err(err) => {
                warn!(
                    event = ROUTE_APPLY_FAILED,
                    component = COMPONENT,
                    route_label = label.as_str(),
                    err = %err,
                    "route rejected"
                );
                return Err(err.into());
            }
        }
    }
    Ok(routes.len())
}

/// Human-readable listing of every port the backend enumerates.
pub fn port_listing(backend: &dyn PortBackend) -> Result<String, MuxerError> {
    let mut listing = String::new();
    for (title, names) in [
        ("inputs", backend.input_port_names()?),
        ("outputs", backend.output_port_names()?),
    ] {
        let _ = writeln!(listing, "{title}:");
        if names.is_empty() {
            let _ = writeln!(listing, "\t(none)");
        }
        for (index, name) in names.iter().enumerate() {
            let _ = writeln!(listing, "\t{index}) {name}");
        }
    }
    Ok(listing)
}
