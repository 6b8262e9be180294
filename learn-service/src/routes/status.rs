use axum::{http::StatusCode, response::IntoResponse};
use tracing::info;

pub async fn get_status_ping() -> impl IntoResponse {
    info!("Status");
    StatusCode::OK
}
