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

use serde::{Deserialize, Serialize};

pub const DEFAULT_ROUTER_NAME: &str = "midi-muxer";

/// How [`Router::start`](crate::Router::start) and [`Router::stop`](crate::Router::stop)
/// treat a failing source.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePolicy {
    /// Stop at the first failing source. Later sources are not attempted.
    #[default]
    FailFast,
    /// Attempt every source and report all failures together.
    BestEffort,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    #[serde(default = "default_router_name")]
    pub name: String,
    #[serde(default)]
    pub lifecycle_policy: LifecyclePolicy,
}

impl RouterConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lifecycle_policy: LifecyclePolicy::default(),
        }
    }

    pub fn with_lifecycle_policy(mut self, lifecycle_policy: LifecyclePolicy) -> Self {
        self.lifecycle_policy = lifecycle_policy;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ROUTER_NAME)
    }
}

fn default_router_name() -> String {
    DEFAULT_ROUTER_NAME.to_string()
}
