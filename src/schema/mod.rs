//! The `schema` module holds the structural contract for inbound messages and
//! the validator that judges payloads against it.
//!
//! The schema is embedded at compile time and compiled once at startup; the
//! resulting `MessageValidator` is immutable and shared by every request.

pub mod check;
pub mod validator;
pub mod verdict;

pub use check::{check_file, exit_status};
pub use validator::MessageValidator;
pub use verdict::{Verdict, Violation};

/// JSON Schema (draft 7) every inbound message must satisfy.
pub const MESSAGE_SCHEMA: &str = include_str!("message.schema.json");
