//! Route-table data model and storage owner for the input -> routes registry.

use crate::control_plane::device_identity::DeviceIdentityKey;
use crate::device::Device;
use crate::route::Route;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Ordered routes of one input, published as copy-on-write snapshots.
///
/// The dispatch worker of the input loads a snapshot per event and never blocks
/// writers. Writers are serialized by the [`RouteTable`] lock.
pub(crate) struct InputRoutes {
    input: Arc<dyn Device>,
    routes: ArcSwap<Vec<Arc<Route>>>,
    dispatching: AtomicBool,
}

impl InputRoutes {
    pub(crate) fn new(input: Arc<dyn Device>) -> Self {
        Self {
            input,
            routes: ArcSwap::from_pointee(Vec::new()),
            dispatching: AtomicBool::new(false),
        }
    }

    pub(crate) fn input(&self) -> &Arc<dyn Device> {
        &self.input
    }

    /// Appends a route and returns the new route count.
    pub(crate) fn push(&self, route: Arc<Route>) -> usize {
        let previous = self.routes.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(route.clone());
            next
        });
        previous.len() + 1
    }

    /// Routes in registration order at the time of the call.
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<Route>>> {
        self.routes.load_full()
    }

    pub(crate) fn len(&self) -> usize {
        self.routes.load().len()
    }

    /// Whether a dispatch loop is still serving these routes.
    pub(crate) fn is_dispatching(&self) -> bool {
        self.dispatching.load(Ordering::SeqCst)
    }

    pub(crate) fn set_dispatching(&self, dispatching: bool) {
        self.dispatching.store(dispatching, Ordering::SeqCst);
    }
}

/// Drops every binding whose dispatch loop has ended and returns how many went.
pub(crate) fn prune_finished(inputs: &mut InputBindings) -> usize {
    let before = inputs.len();
    inputs.retain(|_, binding| binding.is_dispatching());
    before - inputs.len()
}

pub(crate) type InputBindings = HashMap<DeviceIdentityKey, Arc<InputRoutes>>;

/// Registry owner keyed by input device identity.
pub(crate) struct RouteTable {
    inputs: Mutex<InputBindings>,
}

impl RouteTable {
    /// Creates an empty route table.
    pub(crate) fn new() -> Self {
        Self {
            inputs: Mutex::new(HashMap::new()),
        }
    }

    /// Locks the table for a registration transition.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, InputBindings> {
        self.inputs.lock().await
    }

    pub(crate) async fn route_count(&self, input: &Arc<dyn Device>) -> usize {
        let key = DeviceIdentityKey::new(input.clone());
        self.inputs
            .lock()
            .await
            .get(&key)
            .map_or(0, |routes| routes.len())
    }

    #[cfg(test)]
    pub(crate) async fn input_count(&self) -> usize {
        self.inputs.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{prune_finished, InputRoutes, RouteTable};
    use crate::control_plane::device_identity::DeviceIdentityKey;
    use crate::device::Device;
    use crate::route::Route;
    use crate::test_support::StubDevice;
    use std::sync::Arc;

    #[test]
    fn push_keeps_registration_order_and_old_snapshots() {
        let first: Arc<dyn Device> = StubDevice::output("first");
        let second: Arc<dyn Device> = StubDevice::output("second");
        let routes = InputRoutes::new(StubDevice::input("keys"));

        assert_eq!(routes.push(Arc::new(Route::new(first, Vec::new()))), 1);
        let before = routes.snapshot();
        assert_eq!(routes.push(Arc::new(Route::new(second, Vec::new()))), 2);

        assert_eq!(before.len(), 1);
        let names: Vec<_> = routes
            .snapshot()
            .iter()
            .map(|route| route.output().name().to_string())
            .collect();
        assert_eq!(names, ["first", "second"]);
        assert_eq!(routes.input().name(), "keys");
    }

    #[tokio::test]
    async fn prune_finished_keeps_only_dispatching_bindings() {
        let table = RouteTable::new();
        let live: Arc<dyn Device> = StubDevice::input("live");
        let ended: Arc<dyn Device> = StubDevice::input("ended");
        let live_routes = Arc::new(InputRoutes::new(live.clone()));
        live_routes.set_dispatching(true);

        let mut inputs = table.lock().await;
        inputs.insert(DeviceIdentityKey::new(live.clone()), live_routes);
        inputs.insert(
            DeviceIdentityKey::new(ended.clone()),
            Arc::new(InputRoutes::new(ended.clone())),
        );

        assert_eq!(prune_finished(&mut inputs), 1);
        assert!(inputs.contains_key(&DeviceIdentityKey::new(live)));
        assert!(!inputs.contains_key(&DeviceIdentityKey::new(ended)));
    }

    #[tokio::test]
    async fn route_count_is_zero_for_unknown_input() {
        let table = RouteTable::new();
        let input: Arc<dyn Device> = StubDevice::input("keys");

        assert_eq!(table.route_count(&input).await, 0);

        let binding = Arc::new(InputRoutes::new(input.clone()));
        binding.push(Arc::new(Route::new(StubDevice::output("synth"), Vec::new())));
        table
            .lock()
            .await
            .insert(DeviceIdentityKey::new(input.clone()), binding);

        assert_eq!(table.route_count(&input).await, 1);
        assert_eq!(table.input_count().await, 1);
    }
}
