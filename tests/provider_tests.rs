use axum::http::StatusCode as HttpStatus;
use reqwest::StatusCode;
use taxbuddy_lib::{
    core::errors::{AppError, QUOTA_HINT},
    providers::gemini::{candidate_text, classify_status},
};

#[test]
fn quota_429_is_distinguished_from_rate_limit() {
    let quota = classify_status(
        StatusCode::TOO_MANY_REQUESTS,
        "{\"error\":{\"message\":\"You exceeded your current Quota\"}}",
    );
    assert_eq!(quota.code(), "PROVIDER_QUOTA_EXCEEDED");
    assert_eq!(quota.hint(), Some(QUOTA_HINT));
    assert!(!quota.retryable());

    let limited = classify_status(StatusCode::TOO_MANY_REQUESTS, "slow down");
    assert_eq!(limited.code(), "PROVIDER_RATE_LIMITED");
    assert!(limited.retryable());
}

#[test]
fn auth_and_other_failures_are_classified() {
    assert_eq!(
        classify_status(StatusCode::FORBIDDEN, "").code(),
        "PROVIDER_AUTH"
    );
    assert_eq!(
        classify_status(StatusCode::UNAUTHORIZED, "").code(),
        "PROVIDER_AUTH"
    );
    let err = classify_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
    assert_eq!(err.code(), "PROVIDER_INVALID_RESPONSE");
    assert!(!err.retryable());
}

#[test]
fn candidate_parts_are_concatenated() {
    let body = serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "text": "Step 1. " }, { "text": "Done." }] }
        }]
    });
    assert_eq!(candidate_text(&body).expect("text"), "Step 1. Done.");

    let blocked = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } });
    assert_eq!(
        candidate_text(&blocked).expect_err("blocked").code(),
        "PROVIDER_INVALID_RESPONSE"
    );
    assert!(candidate_text(&serde_json::json!({})).is_err());
}

#[test]
fn errors_map_to_http_statuses_and_serialize_details() {
    assert_eq!(
        AppError::InvalidInput("x".to_string()).status(),
        HttpStatus::BAD_REQUEST
    );
    assert_eq!(AppError::quota_exceeded().status(), HttpStatus::TOO_MANY_REQUESTS);
    assert_eq!(AppError::ProviderTimeout.status(), HttpStatus::GATEWAY_TIMEOUT);
    assert_eq!(
        AppError::ExtractionFormat("x".to_string()).status(),
        HttpStatus::BAD_GATEWAY
    );

    let err = AppError::SummaryParse {
        reason: "no block".to_string(),
        raw_response: "raw model text".to_string(),
    };
    assert_eq!(err.status(), HttpStatus::UNPROCESSABLE_ENTITY);
    let body = serde_json::to_value(&err).expect("serialize");
    assert_eq!(body["code"], "SUMMARY_PARSE");
    assert_eq!(body["rawResponse"], "raw model text");
    assert!(body["hint"].is_null());
}
