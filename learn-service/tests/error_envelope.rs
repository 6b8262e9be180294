//! `ApiError` to HTTP response mapping, without a router.

use axum::{http::StatusCode, response::IntoResponse};
use http_body_util::BodyExt;
use learn_service::error::ApiError;
use store::Error;

async fn error_to_response(err: ApiError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn validation_maps_to_400() {
    let (status, json) =
        error_to_response(Error::Validation("title is required".into()).into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["kind"], "ValidationError");
    assert_eq!(json["error"]["message"], "title is required");
}

#[tokio::test]
async fn auth_maps_to_401() {
    let (status, json) = error_to_response(Error::Auth("no session".into()).into()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["kind"], "AuthError");
}

#[tokio::test]
async fn not_found_maps_to_404() {
    let (status, json) = error_to_response(Error::not_found("course", "abc").into()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["kind"], "NotFoundError");
    assert_eq!(json["error"]["message"], "course abc not found");
}

#[tokio::test]
async fn store_failures_are_sanitized() {
    let (status, json) =
        error_to_response(Error::Store("connection string mongodb://secret".into()).into()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"]["kind"], "StoreError");
    assert!(!json.to_string().contains("secret"));

    let (status, json) = error_to_response(ApiError::Upload("AccessDenied".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"]["kind"], "StoreError");
    assert_eq!(json["error"]["message"], "An internal error occurred");
}
