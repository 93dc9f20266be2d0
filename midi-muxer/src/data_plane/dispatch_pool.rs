//! Dispatch worker pool and shared stop signal.

use crate::control_plane::route_table::InputRoutes;
use crate::data_plane::dispatch_worker::{InputDispatchWorker, StopSignal};
use crate::device::EventReceiver;
use crate::observability::events;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info};

const COMPONENT: &str = "dispatch_pool";

/// Owner of every dispatch worker a router has spawned.
pub(crate) struct DispatchPool {
    shutdown: watch::Sender<StopSignal>,
    workers: Mutex<Vec<InputDispatchWorker>>,
    spawned: AtomicUsize,
    active: Arc<AtomicUsize>,
}

impl DispatchPool {
    /// Creates an empty pool with the stop signal cleared.
    pub(crate) fn new() -> Self {
        let (shutdown, _) = watch::channel(StopSignal::default());
        Self {
            shutdown,
            workers: Mutex::new(Vec::new()),
            spawned: AtomicUsize::new(0),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Spawns the dispatch worker of one input.
    pub(crate) fn spawn_worker(
        &self,
        routes: Arc<InputRoutes>,
        receiver: EventReceiver,
    ) -> io::Result<()> {
        let worker = InputDispatchWorker::new(
            routes,
            receiver,
            self.shutdown.subscribe(),
            self.active.clone(),
        )?;
        self.spawned.fetch_add(1, Ordering::SeqCst);

        debug!(
            event = events::DISPATCH_WORKER_CREATE,
            component = COMPONENT,
            worker_id = worker.worker_id(),
            worker_thread = worker.runtime_thread(),
            input = worker.input(),
            "dispatch worker created"
        );

        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        workers.retain(|worker| !worker.is_finished());
        workers.push(worker);
        Ok(())
    }

    /// Retires every worker spawned so far. Workers spawned later idle until
    /// [`DispatchPool::clear_stop`] runs.
    pub(crate) fn signal_stop(&self) {
        let running = self.active_count();
        self.shutdown.send_modify(StopSignal::stop);
        info!(
            event = events::DISPATCH_STOP_SIGNAL,
            component = COMPONENT,
            active_workers = running,
            "stop signalled to dispatch workers"
        );
    }

    pub(crate) fn clear_stop(&self) {
        self.shutdown.send_modify(StopSignal::resume);
    }

    #[cfg(test)]
    pub(crate) fn is_stopped(&self) -> bool {
        self.shutdown.borrow().stopped
    }

    pub(crate) fn spawned_count(&self) -> usize {
        self.spawned.load(Ordering::SeqCst)
    }

    pub(crate) fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for DispatchPool {
    fn drop(&mut self) {
        self.shutdown.send_modify(StopSignal::stop);
    }
}
