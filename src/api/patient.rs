use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::ApiResponse;
use crate::auth::AuthenticatedIdentity;
use crate::error::{AppError, AppResult};
use crate::models::{NewPatient, Patient};
use crate::search::{SearchFilters, SearchQuery};
use crate::state::AppState;

/// POST /patient/create - 创建病人记录
pub async fn create_patient(
    _identity: AuthenticatedIdentity,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewPatient>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Patient>>> {
    let Json(patient) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    let created = state.patients.create_patient(patient).await?;
    Ok(Json(ApiResponse::new(StatusCode::CREATED, "Patient created", created)))
}

/// GET /patient/search - 搜索病人
///
/// The hospital scope always comes from the caller's token.
pub async fn search_patients(
    identity: AuthenticatedIdentity,
    State(state): State<Arc<AppState>>,
    filters: Result<Query<SearchFilters>, QueryRejection>,
) -> AppResult<Json<ApiResponse<Vec<Patient>>>> {
    let Query(filters) = filters.map_err(|e| AppError::validation(e.body_text()))?;
    let query = SearchQuery::for_identity(&identity, filters)?;
    let patients = state.patients.search_patients(&query).await?;
    Ok(Json(ApiResponse::new(StatusCode::OK, "Search patients success", patients)))
}

/// GET /patient/search/:id - 按ID查询病人
pub async fn get_patient(
    identity: AuthenticatedIdentity,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Patient>>> {
    let id: i64 = id
        .parse()
        .map_err(|_| AppError::NotFound(format!("patient with id {} not found", id)))?;
    let patient = state.patients.find_by_id(&identity, id).await?;
    Ok(Json(ApiResponse::new(StatusCode::OK, "Get patient success", patient)))
}
