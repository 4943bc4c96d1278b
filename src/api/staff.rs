use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::ApiResponse;
use crate::error::{AppError, AppResult};
use crate::models::{CreateStaffRequest, LoginRequest, Staff};
use crate::service::LoginOutcome;
use crate::state::AppState;

/// POST /staff/create - 创建员工账号
pub async fn create_staff(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateStaffRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Staff>>> {
    let Json(req) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    let staff = state.staff.create_staff(req).await?;
    Ok(Json(ApiResponse::new(StatusCode::CREATED, "Staff created", staff)))
}

/// POST /staff/login - 员工登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<LoginOutcome>>> {
    let Json(req) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    let outcome = state.staff.login(req).await?;
    Ok(Json(ApiResponse::new(StatusCode::OK, "Login success", outcome)))
}
