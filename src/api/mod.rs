pub mod patient;
pub mod server;
pub mod staff;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Success envelope / 统一响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            status_code: status.as_u16(),
            data,
        }
    }
}

/// Build the HTTP router / 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(server::health_check))
        .route("/staff/create", post(staff::create_staff))
        .route("/staff/login", post(staff::login))
        .route("/patient/create", post(patient::create_patient))
        .route("/patient/search", get(patient::search_patients))
        .route("/patient/search/:id", get(patient::get_patient))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
