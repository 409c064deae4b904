//! Stable client codes.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use greenhouse_core::GreenhouseError;

#[test]
fn storage_errors_map_to_retryable_codes() {
    let unavailable = GreenhouseError::StorageUnavailable("db down".into());
    assert_eq!(unavailable.client_code().as_str(), "STORAGE_UNAVAILABLE");
    assert!(unavailable.client_code().is_retryable());

    let conflict = GreenhouseError::TransactionConflict("busy".into());
    assert_eq!(conflict.client_code().as_str(), "TRANSACTION_CONFLICT");
    assert!(conflict.client_code().is_retryable());
}

#[test]
fn caller_errors_are_not_retryable() {
    for e in [
        GreenhouseError::BadRequest("x".into()),
        GreenhouseError::NotFound("x".into()),
        GreenhouseError::UnsupportedVersion,
        GreenhouseError::Internal("x".into()),
    ] {
        assert!(!e.client_code().is_retryable(), "{e}");
    }
}
