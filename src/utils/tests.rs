use super::error::{EnqueueError, ServerError};
use super::logging;

#[test]
fn logging_init_accepts_levels() {
    // Should not panic
    logging::init("info");
    logging::init("debug");
    logging::init("warn");
}

#[test]
fn unknown_levels_fall_back_to_info() {
    assert_eq!(logging::normalize_level("WARNING"), "warn");
    assert_eq!(logging::normalize_level("Trace"), "trace");
    assert_eq!(logging::normalize_level("loud"), "info");
}

#[test]
fn enqueue_error_labels() {
    assert_eq!(EnqueueError::Full.as_label(), "slow_consumer");
    assert_eq!(EnqueueError::Closed.as_label(), "closed_consumer");
    assert_eq!(EnqueueError::Full.to_string(), "mailbox is full");
}

#[test]
fn bind_error_names_the_address() {
    let err = ServerError::Bind {
        addr: "127.0.0.1:1".to_string(),
        source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
    };
    assert!(err.to_string().starts_with("failed to bind 127.0.0.1:1"));
}
