//! # Unity Validation API
//!
//! An HTTP ingress that validates JSON messages against a fixed schema and
//! forwards the valid ones to a PopSub broker under the `message` topic.
//!
//! ## Core Modules
//!
//! - `schema`: the embedded message schema, the validator and its `Verdict`.
//! - `broker`: connecting to the broker with bounded retries, the shared
//!   connection and the fire-and-forget `Publisher`.
//! - `transport`: HTTP routes and the validate-then-publish handler.
//! - `config`: layered settings from file, environment and `BROKER_URI`.
//! - `app`: startup ordering (connect before listen) and graceful shutdown.
//! - `utils`: error types and logging setup.

pub mod app;
pub mod broker;
pub mod config;
pub mod schema;
pub mod transport;
pub mod utils;
