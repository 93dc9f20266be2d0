//! Control-plane layer.
//!
//! Owns the input -> routes registry and the registration transition of an input:
//! the first route for an input opens its inbound sequence and starts its dispatch
//! worker, later routes only extend the route list the worker already reads.
//! A failed open rolls the input binding back so the next registration retries.
//! Stopping the router retires every binding along with its worker.
//!
//! ```
//! use std::sync::Arc;
//! use midi_muxer::{Device, DeviceError, EventReceiver, EventSender, Router};
//!
//! # struct Broken;
//! #
//! # impl Device for Broken {
//! #     fn is_input(&self) -> bool { true }
//! #     fn is_output(&self) -> bool { true }
//! #     fn name(&self) -> &str { "broken" }
//! #     fn incoming(&self) -> Result<EventReceiver, DeviceError> {
//! #         Err(DeviceError::unavailable("broken", "no such port"))
//! #     }
//! #     fn outgoing(&self) -> Result<EventSender, DeviceError> {
//! #         Err(DeviceError::unavailable("broken", "no such port"))
//! #     }
//! # }
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let router = Router::new("control-plane-doc", Vec::new());
//! let broken: Arc<dyn Device> = Arc::new(Broken);
//!
//! // The open failure is reported and the binding is rolled back.
//! assert!(router.add_route(broken.clone(), broken.clone(), Vec::new()).await.is_err());
//! assert_eq!(router.route_count(&broken).await, 0);
//! assert_eq!(router.dispatch_workers_spawned(), 0);
//! # });
//! ```

pub(crate) mod device_identity;
pub(crate) mod route_lifecycle;
pub(crate) mod route_table;
