//! HTTP API for the learning platform.
//!
//! Routes live under `/api/v1`. Successful responses are wrapped as
//! `{ "data": ... }`, failures as `{ "error": { "kind", "message" } }`.
pub mod auth;
pub mod config;
pub mod error;
pub mod photos;
pub mod response;
pub mod routes;

use std::time::Duration;

use axum::{Router, routing::get};
use tower_http::{
    LatencyUnit,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::AppState;

pub fn app(app_state: AppState) -> Router {
    let request_timeout_in_ms = app_state.env_vars.request_timeout_in_ms;
    let request_body_size_limit = app_state.env_vars.request_body_size_limit;

    Router::new()
        .route("/status/ping", get(routes::status::get_status_ping))
        .nest("/api/v1", routes::api_routes())
        .layer(TimeoutLayer::new(Duration::from_millis(
            request_timeout_in_ms,
        )))
        .layer(RequestBodyLimitLayer::new(request_body_size_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Micros),
                ),
        )
        .with_state(app_state)
}
