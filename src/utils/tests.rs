use super::error::{AttemptError, ConnectError, PublishError};
use super::logging;

#[test]
fn logging_init_accepts_levels() {
    logging::init("info");
    logging::init("debug");
    logging::init("WARNING");
    logging::init("nonsense");
}

#[test]
fn connect_error_names_uri_and_attempts() {
    let err = ConnectError::Exhausted {
        uri: "ws://broker:8080".to_string(),
        attempts: 5,
        last: AttemptError::ClosedDuringHandshake,
    };
    let text = err.to_string();
    assert!(text.contains("ws://broker:8080"));
    assert!(text.contains("5 attempt(s)"));
}

#[test]
fn publish_errors_are_comparable() {
    assert_eq!(PublishError::QueueFull, PublishError::QueueFull);
    assert_ne!(PublishError::QueueFull, PublishError::Disconnected);
}
