//! Structured logging vocabulary shared across the crate.
//!
//! Every log line carries an `event` field drawn from [`events`] and a `component`
//! field naming the emitting module. Dispatch-path lines also carry `worker_id` and
//! `worker_thread`, see [`fields::WorkerContext`].
//!
//! The library never installs a subscriber. Binaries and tests choose one.

pub mod events;
pub mod fields;
