//! Offline validation of a JSON file, backing the `check` subcommand.

use std::path::Path;

use crate::schema::{MessageValidator, Verdict};
use crate::utils::error::CheckError;

/// Reads `path` and judges it against the embedded schema.
pub fn check_file(path: &Path) -> Result<Verdict, CheckError> {
    let payload = std::fs::read(path).map_err(|source| CheckError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let validator = MessageValidator::new()?;
    Ok(validator.validate(&payload)?)
}

/// Process exit status for a `check` run: 0 valid, 1 invalid, 2 not checkable.
pub fn exit_status(result: &Result<Verdict, CheckError>) -> u8 {
    match result {
        Ok(verdict) if verdict.valid => 0,
        Ok(_) => 1,
        Err(_) => 2,
    }
}
