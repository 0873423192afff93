//! The `transport` module is the HTTP face of the service.
//!
//! It wires the routes, the shared application state and the handlers that
//! turn a request body into a validation verdict and, when valid, a publish.

pub mod handlers;
pub mod routes;

pub use handlers::{Outcome, VERSION_BANNER, process_message};
pub use routes::{AppState, create_router};
