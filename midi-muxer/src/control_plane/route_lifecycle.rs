//! Route lifecycle orchestration for input registration transitions.

use crate::control_plane::device_identity::DeviceIdentityKey;
use crate::control_plane::route_table::{prune_finished, InputRoutes, RouteTable};
use crate::data_plane::dispatch_pool::DispatchPool;
use crate::device::{Device, EventReceiver};
use crate::error::{DeviceError, RouterError};
use crate::observability::{events, fields};
use crate::route::{Route, RouteOption};
use std::sync::Arc;
use tracing::{debug, info, warn};

const COMPONENT: &str = "route_lifecycle";

/// Orchestrates registration across the route table and the dispatch pool.
pub(crate) struct RouteLifecycle<'a> {
    route_table: &'a RouteTable,
    dispatch_pool: &'a DispatchPool,
}

impl<'a> RouteLifecycle<'a> {
    /// Creates a lifecycle coordinator using existing domain owners.
    pub(crate) fn new(route_table: &'a RouteTable, dispatch_pool: &'a DispatchPool) -> Self {
        Self {
            route_table,
            dispatch_pool,
        }
    }

    /// Appends a route for `input`, opening the input and spawning its worker when
    /// this is the input's first route.
    ///
    /// The table lock is held for the whole transition, so a concurrent registration
    /// for the same input never observes a binding that is about to be rolled back.
    /// Bindings whose dispatch loop has ended are pruned first, so an input whose
    /// worker is gone takes the first-route path again.
    pub(crate) async fn add_route(
        &self,
        input: Arc<dyn Device>,
        output: Arc<dyn Device>,
        options: Vec<RouteOption>,
    ) -> Result<(), RouterError> {
        let route_label = fields::route_label(input.as_ref(), output.as_ref());
        debug!(
            event = events::ROUTE_ADD_START,
            component = COMPONENT,
            route_label = route_label.as_str(),
            "adding route"
        );

        let route = Arc::new(Route::new(output, options));
        let key = DeviceIdentityKey::new(input.clone());
        let mut inputs = self.route_table.lock().await;

        let pruned = prune_finished(&mut inputs);
        if pruned > 0 {
            debug!(
                event = events::INPUT_BINDING_PRUNED,
                component = COMPONENT,
                pruned,
                reason = fields::REASON_DISPATCH_ENDED,
                "dropped bindings whose dispatch loop ended"
            );
        }

        if let Some(binding) = inputs.get(&key) {
            let route_count = binding.push(route);
            debug!(
                event = events::DISPATCH_WORKER_REUSE,
                component = COMPONENT,
                route_label = route_label.as_str(),
                route_count,
                "input already dispatching; route appended"
            );
            info!(
                event = events::ROUTE_ADD_OK,
                component = COMPONENT,
                route_label = route_label.as_str(),
                route_count,
                "route added"
            );
            return Ok(());
        }

        let binding = Arc::new(InputRoutes::new(input.clone()));
        binding.push(route);
        inputs.insert(key.clone(), binding.clone());

        let receiver = match Self::open_input(input.clone()).await {
            Ok(receiver) => {
                debug!(
                    event = events::INPUT_OPEN_OK,
                    component = COMPONENT,
                    input = input.name(),
                    "inbound sequence opened"
                );
                receiver
            }
            Err(cause) => {
                inputs.remove(&key);
                warn!(
                    event = events::INPUT_OPEN_FAILED,
                    component = COMPONENT,
                    input = input.name(),
                    err = %cause,
                    "failed to open inbound sequence"
                );
                Self::log_rollback(&route_label);
                return Err(RouterError::OpenInput {
                    input: input.name().to_string(),
                    cause,
                });
            }
        };

        if let Err(cause) = self.dispatch_pool.spawn_worker(binding, receiver) {
            inputs.remove(&key);
            Self::log_rollback(&route_label);
            return Err(RouterError::SpawnWorker {
                input: input.name().to_string(),
                cause,
            });
        }

        info!(
            event = events::ROUTE_ADD_OK,
            component = COMPONENT,
            route_label = route_label.as_str(),
            route_count = 1usize,
            "route added"
        );
        Ok(())
    }

    /// Retires every binding and signals their workers to stop.
    ///
    /// Runs under the table lock, so no registration interleaves with the stop.
    pub(crate) async fn retire_all(&self) {
        let mut inputs = self.route_table.lock().await;
        self.dispatch_pool.signal_stop();
        let retired = inputs.len();
        inputs.clear();
        debug!(
            event = events::INPUT_BINDINGS_RETIRED,
            component = COMPONENT,
            retired,
            reason = fields::REASON_STOP_REQUESTED,
            "input bindings retired"
        );
    }

    /// Runs [`Device::incoming`] on the blocking pool; native opens may wait on a
    /// driver thread.
    async fn open_input(input: Arc<dyn Device>) -> Result<EventReceiver, DeviceError> {
        let name = input.name().to_string();
        tokio::task::spawn_blocking(move || input.incoming())
            .await
            .unwrap_or_else(|err| Err(DeviceError::unavailable(name, err)))
    }

    fn log_rollback(route_label: &str) {
        warn!(
            event = events::INPUT_BINDING_ROLLBACK,
            component = COMPONENT,
            route_label,
            "input binding rolled back"
        );
        warn!(
            event = events::ROUTE_ADD_FAILED,
            component = COMPONENT,
            route_label,
            "route add failed"
        );
    }
}
