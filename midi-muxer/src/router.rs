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

use crate::config::{LifecyclePolicy, RouterConfig};
use crate::control_plane::route_lifecycle::RouteLifecycle;
use crate::control_plane::route_table::RouteTable;
use crate::data_plane::dispatch_pool::DispatchPool;
use crate::device::{Device, Source};
use crate::error::{LifecyclePhase, RouterError};
use crate::observability::{events, fields};
use crate::route::RouteOption;
use std::sync::Arc;
use tracing::{debug, info, warn};

const COMPONENT: &str = "router";

///
/// [`Router`] owns a fixed set of [`Source`]s and routes events from their input
/// devices to their output devices.
///
/// Each input with at least one route gets exactly one dispatch worker running on its
/// own thread. Routes are evaluated per event in registration order.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use midi_muxer::{with_filter, ChannelFilter, Device, DeviceError, EventReceiver,
///     EventSender, InboundPort, OutboundPort, Router, Source, SourceError};
///
/// # struct Loop {
/// #     inbound: InboundPort,
/// #     outbound: OutboundPort,
/// # }
/// #
/// # impl Device for Loop {
/// #     fn is_input(&self) -> bool { true }
/// #     fn is_output(&self) -> bool { true }
/// #     fn name(&self) -> &str { "loop" }
/// #     fn incoming(&self) -> Result<EventReceiver, DeviceError> {
/// #         self.inbound.open_with("loop", |_| Ok(()))
/// #     }
/// #     fn outgoing(&self) -> Result<EventSender, DeviceError> {
/// #         self.outbound.open_with("loop", |_receiver| Ok(()))
/// #     }
/// # }
/// #
/// # struct LoopSource(Arc<Loop>);
/// #
/// # #[async_trait]
/// # impl Source for LoopSource {
/// #     fn name(&self) -> &str { "loop-source" }
/// #     async fn start(&self) -> Result<(), SourceError> { Ok(()) }
/// #     async fn stop(&self) -> Result<(), SourceError> { Ok(()) }
/// #     fn devices(&self) -> Vec<Arc<dyn Device>> {
/// #         let device: Arc<dyn Device> = self.0.clone();
/// #         vec![device]
/// #     }
/// # }
/// #
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// # let device = Arc::new(Loop { inbound: InboundPort::new(8), outbound: OutboundPort::new(8) });
/// let source: Arc<dyn Source> = Arc::new(LoopSource(device));
/// let router = Router::new("quick-start", vec![source]);
/// router.start().await.unwrap();
///
/// let input = router.inputs().remove(0);
/// let output = router.outputs().remove(0);
/// router
///     .add_route(input.clone(), output, vec![with_filter(ChannelFilter::new(1))])
///     .await
///     .unwrap();
///
/// assert_eq!(router.route_count(&input).await, 1);
/// assert_eq!(router.dispatch_workers_spawned(), 1);
/// router.stop().await.unwrap();
/// # });
/// ```
pub struct Router {
    config: RouterConfig,
    sources: Vec<Arc<dyn Source>>,
    route_table: RouteTable,
    dispatch_pool: DispatchPool,
}

impl Router {
    /// Creates a router over `sources` with the default lifecycle policy.
    pub fn new(name: impl Into<String>, sources: Vec<Arc<dyn Source>>) -> Self {
        Self::with_config(RouterConfig::new(name), sources)
    }

    pub fn with_config(config: RouterConfig, sources: Vec<Arc<dyn Source>>) -> Self {
        debug!(
            event = events::ROUTER_CREATE,
            component = COMPONENT,
            router = config.name.as_str(),
            sources = sources.len(),
            lifecycle_policy = ?config.lifecycle_policy,
            "router created"
        );
        Self {
            config,
            sources,
            route_table: RouteTable::new(),
            dispatch_pool: DispatchPool::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Starts every source in registration order.
    ///
    /// Clears a stop signal left by an earlier [`Router::stop`], so routes added
    /// afterwards dispatch again.
    pub async fn start(&self) -> Result<(), RouterError> {
        self.dispatch_pool.clear_stop();
        info!(
            event = events::ROUTER_START,
            component = COMPONENT,
            router = self.name(),
            sources = self.sources.len(),
            "starting router"
        );
        self.run_lifecycle(LifecyclePhase::Start).await
    }

    /// Signals every dispatch worker to stop, then stops every source.
    ///
    /// Routes registered so far are retired with their workers, whether or not every
    /// source stops cleanly. After the next [`Router::start`], routing an input again
    /// opens it afresh and spawns a new worker.
    pub async fn stop(&self) -> Result<(), RouterError> {
        RouteLifecycle::new(&self.route_table, &self.dispatch_pool)
            .retire_all()
            .await;
        info!(
            event = events::ROUTER_STOP,
            component = COMPONENT,
            router = self.name(),
            sources = self.sources.len(),
            "stopping router"
        );
        self.run_lifecycle(LifecyclePhase::Stop).await
    }

    /// Devices of every source that can produce events.
    pub fn inputs(&self) -> Vec<Arc<dyn Device>> {
        self.devices_where(|device| device.is_input())
    }

    /// Devices of every source that can accept events.
    pub fn outputs(&self) -> Vec<Arc<dyn Device>> {
        self.devices_where(|device| device.is_output())
    }

    /// Registers a route from `input` to `output`.
    ///
    /// The first route for an input opens its inbound sequence and starts its
    /// dispatch worker. If the open fails nothing is registered and the error is
    /// returned; a later call for the same input tries again.
    pub async fn add_route(
        &self,
        input: Arc<dyn Device>,
        output: Arc<dyn Device>,
        options: Vec<RouteOption>,
    ) -> Result<(), RouterError> {
        RouteLifecycle::new(&self.route_table, &self.dispatch_pool)
            .add_route(input, output, options)
            .await
    }

    /// Number of routes registered for `input`.
    pub async fn route_count(&self, input: &Arc<dyn Device>) -> usize {
        self.route_table.route_count(input).await
    }

    /// Dispatch workers spawned over the router's lifetime.
    pub fn dispatch_workers_spawned(&self) -> usize {
        self.dispatch_pool.spawned_count()
    }

    /// Dispatch loops currently running.
    pub fn active_dispatch_workers(&self) -> usize {
        self.dispatch_pool.active_count()
    }

    fn devices_where(&self, keep: impl Fn(&dyn Device) -> bool) -> Vec<Arc<dyn Device>> {
        self.sources
            .iter()
            .flat_map(|source| source.devices())
            .filter(|device| keep(device.as_ref()))
            .collect()
    }

    async fn run_lifecycle(&self, phase: LifecyclePhase) -> Result<(), RouterError> {
        let mut failures = Vec::new();

        for (index, source) in self.sources.iter().enumerate() {
            let result = match phase {
                LifecyclePhase::Start => source.start().await,
                LifecyclePhase::Stop => source.stop().await,
            };

            match result {
                Ok(()) => {
                    info!(
                        event = lifecycle_ok_event(phase),
                        component = COMPONENT,
                        router = self.name(),
                        source_name = source.name(),
                        "source transition succeeded"
                    );
                }
                Err(err) => {
                    warn!(
                        event = lifecycle_failed_event(phase),
                        component = COMPONENT,
                        router = self.name(),
                        source_name = source.name(),
                        err = %err,
                        "source transition failed"
                    );
                    failures.push(err);

                    if self.config.lifecycle_policy == LifecyclePolicy::FailFast {
                        for skipped in &self.sources[index + 1..] {
                            debug!(
                                event = events::SOURCE_SKIPPED,
                                component = COMPONENT,
                                router = self.name(),
                                source_name = skipped.name(),
                                reason = fields::REASON_EARLIER_FAILURE,
                                "source transition skipped"
                            );
                        }
                        break;
                    }
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(RouterError::Lifecycle { phase, failures })
        }
    }
}

fn lifecycle_ok_event(phase: LifecyclePhase) -> &'static str {
    match phase {
        LifecyclePhase::Start => events::SOURCE_START_OK,
        LifecyclePhase::Stop => events::SOURCE_STOP_OK,
    }
}

fn lifecycle_failed_event(phase: LifecyclePhase) -> &'static str {
    match phase {
        LifecyclePhase::Start => events::SOURCE_START_FAILED,
        LifecyclePhase::Stop => events::SOURCE_STOP_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::Router;
    use crate::config::{LifecyclePolicy, RouterConfig, DEFAULT_ROUTER_NAME};

    #[test]
    fn router_exposes_config() {
        let router = Router::with_config(
            RouterConfig::default().with_lifecycle_policy(LifecyclePolicy::BestEffort),
            Vec::new(),
        );

        assert_eq!(router.name(), DEFAULT_ROUTER_NAME);
        assert_eq!(router.config().lifecycle_policy, LifecyclePolicy::BestEffort);
        assert!(router.inputs().is_empty());
        assert!(router.outputs().is_empty());
        assert_eq!(router.dispatch_workers_spawned(), 0);
        assert_eq!(router.active_dispatch_workers(), 0);
    }

    #[tokio::test]
    async fn start_and_stop_without_sources_succeed() {
        let router = Router::new("empty", Vec::new());

        router.start().await.expect("nothing to start");
        router.stop().await.expect("nothing to stop");
        router.start().await.expect("restart is allowed");
    }
}
