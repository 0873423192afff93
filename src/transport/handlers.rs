use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::broker::MESSAGE_TOPIC;
use crate::schema::{Verdict, Violation};
use crate::transport::routes::AppState;
use crate::utils::error::{PublishError, ValidationError};

/// Body of `GET /api/v1/unitytestapi`.
pub const VERSION_BANNER: &str = "Unity Validation API Test v 0.2";

const VALID_MESSAGE: &str = "The json parameter is valid.";
const INVALID_MESSAGE: &str = "The json parameter is not valid.";
const MALFORMED_MESSAGE: &str = "The request body is not valid JSON.";

/// Where a single POST ended up.
#[derive(Debug)]
pub enum Outcome {
    /// Valid and handed to the broker.
    Published,
    /// Valid, but the broker could not take it. Still a success for the caller.
    PublishFailed(PublishError),
    /// Parsed, but broke the schema. Nothing was published.
    Invalid(Verdict),
    /// Not JSON. Nothing was published.
    Malformed(ValidationError),
}

/// Validates `body` and publishes it under `message` when it passes.
pub fn process_message(state: &AppState, body: &[u8]) -> Outcome {
    let verdict = match state.validator.validate(body) {
        Ok(verdict) => verdict,
        Err(e) => {
            warn!(error = %e, "rejecting malformed payload");
            return Outcome::Malformed(e);
        }
    };

    if !verdict.valid {
        warn!(violations = verdict.violations.len(), "payload failed schema validation");
        return Outcome::Invalid(verdict);
    }

    match state.publisher.publish(MESSAGE_TOPIC, body) {
        Ok(()) => {
            info!(topic = MESSAGE_TOPIC, bytes = body.len(), "published message");
            Outcome::Published
        }
        Err(e) => {
            error!(topic = MESSAGE_TOPIC, error = %e, "failed to publish validated message");
            Outcome::PublishFailed(e)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Violation>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Outcome::Published => (
                StatusCode::OK,
                IngestResponse {
                    valid: true,
                    published: Some(true),
                    message: VALID_MESSAGE.to_string(),
                    errors: Vec::new(),
                },
            ),
            Outcome::PublishFailed(_) => (
                StatusCode::OK,
                IngestResponse {
                    valid: true,
                    published: Some(false),
                    message: VALID_MESSAGE.to_string(),
                    errors: Vec::new(),
                },
            ),
            Outcome::Invalid(verdict) => (
                StatusCode::BAD_REQUEST,
                IngestResponse {
                    valid: false,
                    published: None,
                    message: INVALID_MESSAGE.to_string(),
                    errors: verdict.violations,
                },
            ),
            Outcome::Malformed(ValidationError::MalformedJson(e)) => (
                StatusCode::BAD_REQUEST,
                IngestResponse {
                    valid: false,
                    published: None,
                    message: MALFORMED_MESSAGE.to_string(),
                    errors: vec![Violation {
                        path: "/".to_string(),
                        reason: e.to_string(),
                    }],
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// `POST /api/v1/unitytestapi`
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    info!("message received");
    match body {
        Ok(body) => process_message(&state, &body).into_response(),
        Err(rejection) => body_read_failure(rejection),
    }
}

fn body_read_failure(rejection: BytesRejection) -> Response {
    let status = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        StatusCode::PAYLOAD_TOO_LARGE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    error!(%status, error = %rejection.body_text(), "failed to read request body");
    (
        status,
        Json(ApiError {
            error: "BodyReadFailure".to_string(),
            message: rejection.body_text(),
        }),
    )
        .into_response()
}

/// `GET /healthcheck`
pub async fn healthcheck() -> &'static str {
    "OK"
}

/// `GET /api/v1/unitytestapi`
pub async fn version() -> &'static str {
    VERSION_BANNER
}
