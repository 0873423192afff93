//! The `utils` module provides the pieces shared across the service:
//! the error taxonomy and logging initialisation.

pub mod error;
pub mod logging;

#[cfg(test)]
mod tests;
