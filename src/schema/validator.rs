use jsonschema::Validator;
use serde_json::Value;

use crate::schema::MESSAGE_SCHEMA;
use crate::schema::verdict::{Verdict, Violation};
use crate::utils::error::{SchemaError, ValidationError};

/// Compiled form of the message schema.
pub struct MessageValidator {
    validator: Validator,
}

impl MessageValidator {
    /// Compiles the embedded message schema.
    pub fn new() -> Result<Self, SchemaError> {
        let schema: Value = serde_json::from_str(MESSAGE_SCHEMA)?;
        Self::from_schema(&schema)
    }

    /// Compiles an arbitrary draft 7 schema. Formats such as `ipv4` are enforced.
    pub fn from_schema(schema: &Value) -> Result<Self, SchemaError> {
        let validator = jsonschema::draft7::options()
            .should_validate_formats(true)
            .build(schema)
            .map_err(|err| SchemaError::Compile(err.to_string()))?;
        Ok(Self { validator })
    }

    /// Parses `payload` as JSON and checks it against the schema.
    ///
    /// Bytes that are not JSON at all are an error, not an invalid verdict.
    pub fn validate(&self, payload: &[u8]) -> Result<Verdict, ValidationError> {
        let value: Value = serde_json::from_slice(payload)?;
        Ok(self.validate_value(&value))
    }

    pub fn validate_value(&self, value: &Value) -> Verdict {
        let violations = self
            .validator
            .iter_errors(value)
            .map(|err| {
                let path = err.instance_path().as_str();
                Violation {
                    path: if path.is_empty() { "/".to_string() } else { path.to_string() },
                    reason: err.to_string(),
                }
            })
            .collect();
        Verdict::from_violations(violations)
    }
}

impl std::fmt::Debug for MessageValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageValidator")
            .field("validator", &"jsonschema::Validator")
            .finish()
    }
}
