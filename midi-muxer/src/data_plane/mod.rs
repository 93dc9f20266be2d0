//! Data-plane layer.
//!
//! Owns one dispatch worker per routed input. A worker takes events from the
//! input's inbound sequence in arrival order, evaluates them against the input's
//! current route snapshot in registration order and forwards accepted, transformed
//! copies into each route's output sink.
//!
//! Forwarding awaits the sink, so a slow output holds back every route of the same
//! input. Forward failures are logged and only affect the failing route.

pub(crate) mod dispatch_pool;
pub(crate) mod dispatch_worker;
