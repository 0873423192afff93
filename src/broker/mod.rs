//! The `broker` module owns everything on the PopSub side of the service:
//! the wire messages, connecting with bounded retries, the long-lived
//! connection and the `Publisher` seam used by request handlers.

pub mod connection;
pub mod connector;
pub mod message;
pub mod publisher;

pub use connection::BrokerConnection;
pub use connector::connect;
pub use publisher::{MESSAGE_TOPIC, Publisher};

#[cfg(test)]
pub(crate) mod mock;
