// Error handling tests
// Author: kelexine (https://github.com/kelexine)

use axum::http::StatusCode;
use axum::response::IntoResponse;
use math_advisor::error::{AdvisorError, GatewayError, GatewayErrorKind};

#[test]
fn test_gateway_display_is_message_only() {
    let error = GatewayError::network("deadline exceeded");
    assert_eq!(format!("{}", error), "deadline exceeded");
    assert_eq!(error.display_text(), "Error: deadline exceeded");
}

#[test]
fn test_gateway_kinds() {
    assert_eq!(GatewayError::network("x").kind, GatewayErrorKind::Network);
    assert_eq!(GatewayError::auth("x").kind, GatewayErrorKind::Auth);
    assert_eq!(GatewayError::quota("x").kind, GatewayErrorKind::Quota);
    assert_eq!(GatewayError::unknown("x").kind, GatewayErrorKind::Unknown);
}

#[test]
fn test_only_transient_errors_retry() {
    assert!(GatewayError::network("x").is_retryable());
    assert!(GatewayError::quota("x").is_retryable());
    assert!(!GatewayError::auth("x").is_retryable());
    assert!(!GatewayError::unknown("x").is_retryable());
}

#[test]
fn test_kind_serializes_lowercase() {
    assert_eq!(
        serde_json::to_string(&GatewayErrorKind::Quota).unwrap(),
        "\"quota\""
    );
}

#[test]
fn test_error_display_messages() {
    let errors = vec![
        AdvisorError::Config("bad port".to_string()),
        AdvisorError::InvalidRequest("Bad request".to_string()),
        AdvisorError::Gateway(GatewayError::unknown("API error")),
        AdvisorError::Internal("oops".to_string()),
    ];

    for error in errors {
        let display = format!("{}", error);
        assert!(!display.is_empty(), "Error should have display message");
    }
}

#[test]
fn test_invalid_request_is_bad_request() {
    let response = AdvisorError::InvalidRequest("Please upload an image first!".to_string())
        .into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_quota_maps_to_too_many_requests() {
    let response = AdvisorError::from(GatewayError::quota("slow down")).into_response();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[test]
fn test_other_gateway_errors_are_bad_gateway() {
    let response = AdvisorError::from(GatewayError::network("refused")).into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn test_upload_too_large_is_payload_too_large() {
    let error = AdvisorError::UploadTooLarge("The image is too large.".to_string());
    assert_eq!(error.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
}
