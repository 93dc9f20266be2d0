//! Runtime integration layer.
//!
//! Isolates the thread and tokio runtime boundary of dispatch workers so the rest
//! of the crate stays runtime-agnostic: the router itself can be driven from any
//! tokio runtime, while each dispatch loop owns a dedicated current-thread runtime.

pub(crate) mod worker_runtime;
