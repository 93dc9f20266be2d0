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

use crate::error::MuxerError;
use midi_muxer::{
    with_filter, with_transformer, AftertouchToPitchBend, ChannelFilter, NoteCondition,
    NoteFilter, RouteOption, RouterConfig,
};
use midi_muxer_native::NativeSourceConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CLIENT_NAME: &str = "midi-muxer";
const MAX_DATA_VALUE: u8 = 0x7F;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub source: NativeSourceConfig,
    #[serde(default = "default_client_name")]
    pub client_name: String,
    pub routes: Vec<RouteConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
    #[serde(default)]
    pub transformers: Vec<TransformerConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterConfig {
    Channel { channel: u8 },
    Note { note: u8, condition: NoteCondition },
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformerConfig {
    AftertouchToPitchBend,
}

impl Config {
    pub fn from_json5(contents: &str) -> Result<Self, MuxerError> {
        json5::from_str(contents).map_err(|err| MuxerError::Parse {
            reason: err.to_string(),
        })
    }

    /// Reads, parses and validates a config file.
    pub fn load(path: &Path) -> Result<Self, MuxerError> {
        let contents = std::fs::read_to_string(path).map_err(|cause| MuxerError::Read {
            path: path.to_path_buf(),
            cause,
        })?;
        let config = Self::from_json5(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MuxerError> {
        if self.routes.is_empty() {
            return Err(MuxerError::invalid("no routes configured"));
        }

        for (index, route) in self.routes.iter().enumerate() {
            route
                .validate()
                .map_err(|reason| MuxerError::invalid(format!("route {index}: {reason}")))?;

            if let Some(earlier) = self.routes[..index].iter().position(|other| other == route) {
                return Err(MuxerError::invalid(format!(
                    "route {index} duplicates route {earlier}"
                )));
            }
        }
        Ok(())
    }
}

impl RouteConfig {
    fn validate(&self) -> Result<(), String> {
        if self.input.trim().is_empty() || self.output.trim().is_empty() {
            return Err("input and output names must not be empty".to_string());
        }
        self.filters.iter().try_for_each(FilterConfig::validate)
    }

    /// Route options in the order they are configured: filters, then transformers.
    pub fn options(&self) -> Vec<RouteOption> {
        let filters = self.filters.iter().map(|filter| match *filter {
            FilterConfig::Channel { channel } => with_filter(ChannelFilter::new(channel)),
            FilterConfig::Note { note, condition } => with_filter(NoteFilter::new(note, condition)),
        });
        let transformers = self.transformers.iter().map(|transformer| match transformer {
            TransformerConfig::AftertouchToPitchBend => with_transformer(AftertouchToPitchBend),
        });
        filters.chain(transformers).collect()
    }
}

impl FilterConfig {
    fn validate(&self) -> Result<(), String> {
        match *self {
            FilterConfig::Channel { channel } if ChannelFilter::try_new(channel).is_none() => {
                Err(format!("channel {channel} is outside 1-16"))
            }
            FilterConfig::Note { note, .. } if note > MAX_DATA_VALUE => {
                Err(format!("note {note} is outside 0-127"))
            }
            _ => Ok(()),
        }
    }
}

fn default_client_name() -> String {
    DEFAULT_CLIENT_NAME.to_string()
}
