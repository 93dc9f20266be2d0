//! Runtime helper for spawning per-input dispatch loops.

use crate::observability::{events, fields};
use std::future::Future;
use std::io;
use std::thread;
use tokio::runtime::Builder;
use tracing::{debug, error, warn};

pub(crate) const DEFAULT_DISPATCH_RUNTIME_THREAD_NAME: &str = "mux-dispatch";
const COMPONENT: &str = "worker_runtime";

/// Handle for one dispatch loop thread.
pub(crate) struct DispatchLoopHandle {
    worker_thread: String,
    join_handle: thread::JoinHandle<()>,
}

impl DispatchLoopHandle {
    pub(crate) fn worker_thread(&self) -> &str {
        &self.worker_thread
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }
}

/// Spawns `run_loop` on a named OS thread driving its own current-thread runtime.
///
/// Returns the spawn error when the OS refuses the thread. A runtime that fails to
/// build is logged on the worker thread and the loop never runs.
pub(crate) fn spawn_dispatch_loop<F, Fut>(
    thread_name: String,
    run_loop: F,
) -> io::Result<DispatchLoopHandle>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + 'static,
{
    let thread_name = if thread_name.is_empty() || thread_name.contains('\0') {
        warn!(
            event = events::RUNTIME_THREAD_NAME_FALLBACK,
            component = COMPONENT,
            requested = thread_name.as_str(),
            fallback = DEFAULT_DISPATCH_RUNTIME_THREAD_NAME,
            reason = fields::REASON_INVALID_THREAD_NAME,
            "invalid dispatch thread name; using fallback"
        );
        DEFAULT_DISPATCH_RUNTIME_THREAD_NAME.to_string()
    } else {
        thread_name
    };

    let spawned = thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!(
                        event = events::RUNTIME_BUILD_FAILED,
                        component = COMPONENT,
                        err = %err,
                        "failed to build dispatch runtime"
                    );
                    return;
                }
            };

            runtime.block_on(run_loop());
        });

    match spawned {
        Ok(join_handle) => {
            debug!(
                event = events::RUNTIME_SPAWN_OK,
                component = COMPONENT,
                worker_thread = thread_name.as_str(),
                "dispatch runtime thread spawned"
            );
            Ok(DispatchLoopHandle {
                worker_thread: thread_name,
                join_handle,
            })
        }
        Err(err) => {
            error!(
                event = events::RUNTIME_SPAWN_FAILED,
                component = COMPONENT,
                worker_thread = thread_name.as_str(),
                err = %err,
                "failed to spawn dispatch runtime thread"
            );
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{spawn_dispatch_loop, DEFAULT_DISPATCH_RUNTIME_THREAD_NAME};
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[test]
    fn dispatch_loop_runs_on_named_thread() {
        let (tx, rx) = std::sync::mpsc::channel();

        let handle = spawn_dispatch_loop("mux-in-test".to_string(), move || async move {
            tokio::task::yield_now().await;
            let name = std::thread::current().name().map(str::to_string);
            tx.send(name).expect("test receiver alive");
        })
        .expect("thread should spawn");

        assert_eq!(handle.worker_thread(), "mux-in-test");
        let name = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("loop should report its thread name");
        assert_eq!(name.as_deref(), Some("mux-in-test"));
    }

    #[test]
    fn invalid_thread_name_uses_fallback() {
        let (tx, rx) = oneshot::channel::<()>();

        let handle = spawn_dispatch_loop("bad\0name".to_string(), move || async move {
            let _ = rx.await;
        })
        .expect("thread should spawn");

        assert_eq!(handle.worker_thread(), DEFAULT_DISPATCH_RUNTIME_THREAD_NAME);
        assert!(!handle.is_finished());
        drop(tx);
    }
}
