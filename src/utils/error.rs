//! The `error` module defines the error types used across the service.
//!
//! Validation failures are not errors here: a payload that parses but breaks
//! the schema produces a `Verdict`. Only malformed input, broker trouble and
//! startup problems are represented as error values.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The configuration could not be loaded or deserialized.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// The embedded message schema failed to compile.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("embedded schema is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to compile schema: {0}")]
    Compile(String),
}

/// The inbound payload could not be judged against the schema at all.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("payload is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

/// A single attempt to reach the broker failed.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("failed to encode handshake frame: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("broker rejected the handshake: {0}")]
    Rejected(String),

    #[error("unexpected handshake reply: {0}")]
    UnexpectedReply(String),

    #[error("broker closed the connection during the handshake")]
    ClosedDuringHandshake,

    #[error("handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),
}

/// The broker could not be reached within the configured attempts.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("could not connect to broker at {uri} after {attempts} attempt(s): {last}")]
    Exhausted {
        uri: String,
        attempts: u32,
        #[source]
        last: AttemptError,
    },
}

/// A publish could not be handed to the broker writer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PublishError {
    #[error("broker connection is closed")]
    Disconnected,

    #[error("publish queue is full")]
    QueueFull,

    #[error("payload is not valid UTF-8")]
    InvalidPayload,
}

/// `check` could not produce a verdict for a file.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
