use serde::Serialize;

/// One broken constraint: where in the payload, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON pointer into the payload; `/` for the document root.
    pub path: String,
    pub reason: String,
}

/// The validator's judgement on one payload.
///
/// `valid` is true exactly when `violations` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub valid: bool,
    pub violations: Vec<Violation>,
}

impl Verdict {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
        }
    }
}
