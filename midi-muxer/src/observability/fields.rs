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

//! Canonical structured field values and value-format helpers.

use crate::device::Device;
use crate::event::Event;

pub const REASON_BROADCAST_CLOSED: &str = "broadcast_closed";
pub const REASON_SINK_CLOSED: &str = "sink_closed";
pub const REASON_STOP_REQUESTED: &str = "stop_requested";
pub const REASON_INVALID_THREAD_NAME: &str = "invalid_thread_name";
pub const REASON_EARLIER_FAILURE: &str = "earlier_source_failed";
pub const REASON_DISPATCH_ENDED: &str = "dispatch_ended";
pub const DEFAULT_WORKER_THREAD: &str = "unknown-thread";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorkerContext {
    pub worker_id: String,
    pub worker_thread: String,
}

impl WorkerContext {
    pub fn new(worker_id: impl Into<String>, worker_thread: Option<&str>) -> Self {
        Self {
            worker_id: worker_id.into(),
            worker_thread: thread_name_or_default(worker_thread),
        }
    }

    pub fn with_current_thread(worker_id: impl Into<String>) -> Self {
        Self::new(worker_id, std::thread::current().name())
    }
}

pub fn thread_name_or_default(thread_name: Option<&str>) -> String {
    thread_name.unwrap_or(DEFAULT_WORKER_THREAD).to_string()
}

pub fn format_event(event: &Event) -> String {
    event.to_string()
}

/// `input->output` label used to correlate a route's log lines.
pub fn route_label(input: &dyn Device, output: &dyn Device) -> String {
    format!("{}->{}", input.name(), output.name())
}
