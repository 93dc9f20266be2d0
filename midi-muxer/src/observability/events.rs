//! Canonical structured event names used across `midi-muxer`.

// Control-plane route registration events.
pub const ROUTE_ADD_START: &str = "route_add_start";
pub const ROUTE_ADD_OK: &str = "route_add_ok";
pub const ROUTE_ADD_FAILED: &str = "route_add_failed";
pub const INPUT_OPEN_OK: &str = "input_open_ok";
pub const INPUT_OPEN_FAILED: &str = "input_open_failed";
pub const INPUT_BINDING_ROLLBACK: &str = "input_binding_rollback";
pub const INPUT_BINDING_PRUNED: &str = "input_binding_pruned";
pub const INPUT_BINDINGS_RETIRED: &str = "input_bindings_retired";

// Dispatch worker and pool events.
pub const DISPATCH_WORKER_CREATE: &str = "dispatch_worker_create";
pub const DISPATCH_WORKER_REUSE: &str = "dispatch_worker_reuse";
pub const DISPATCH_RECEIVE: &str = "dispatch_receive";
pub const DISPATCH_FILTERED: &str = "dispatch_filtered";
pub const DISPATCH_FORWARD_OK: &str = "dispatch_forward_ok";
pub const DISPATCH_FORWARD_FAILED: &str = "dispatch_forward_failed";
pub const DISPATCH_SINK_UNAVAILABLE: &str = "dispatch_sink_unavailable";
pub const DISPATCH_RECV_LAGGED: &str = "dispatch_recv_lagged";
pub const DISPATCH_RECV_CLOSED: &str = "dispatch_recv_closed";
pub const DISPATCH_STOP_SIGNAL: &str = "dispatch_stop_signal";

// Runtime events.
pub const RUNTIME_THREAD_NAME_FALLBACK: &str = "runtime_thread_name_fallback";
pub const RUNTIME_SPAWN_OK: &str = "runtime_spawn_ok";
pub const RUNTIME_SPAWN_FAILED: &str = "runtime_spawn_failed";
pub const RUNTIME_BUILD_FAILED: &str = "runtime_build_failed";

// Router and source lifecycle events.
pub const ROUTER_CREATE: &str = "router_create";
pub const ROUTER_START: &str = "router_start";
pub const ROUTER_STOP: &str = "router_stop";
pub const SOURCE_START_OK: &str = "source_start_ok";
pub const SOURCE_START_FAILED: &str = "source_start_failed";
pub const SOURCE_STOP_OK: &str = "source_stop_ok";
pub const SOURCE_STOP_FAILED: &str = "source_stop_failed";
pub const SOURCE_SKIPPED: &str = "source_skipped";
