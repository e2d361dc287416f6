//! Handlers for the `/templates` resource.
//!
//! Every handler requires a bearer token and only ever sees the caller's own
//! templates. Someone else's template answers 404, exactly like a missing one.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use menuprint_core::types::DbId;
use menuprint_db::models::template::{
    CreateTemplate, Template, TemplateWithLatest, UpdateTemplateMetadata,
};
use menuprint_db::models::template_version::{
    HistoryReport, TemplateVersion, TemplateVersionList, TemplateVersionSummary,
};
use menuprint_db::services::TemplateService;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response for `POST /templates`.
#[derive(Debug, Serialize)]
pub struct CreateTemplateResponse {
    pub id: DbId,
    pub version: i32,
    pub message: &'static str,
}

/// Response for `POST /templates/{id}/versions`.
#[derive(Debug, Serialize)]
pub struct AddVersionResponse {
    pub version: i32,
}

/// POST /api/v1/templates
///
/// Create a template; its initial `data` becomes version 1.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTemplate>,
) -> AppResult<(StatusCode, Json<DataResponse<CreateTemplateResponse>>)> {
    let created = TemplateService::create(&state.pool, auth.user_id, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreateTemplateResponse {
                id: created.id,
                version: created.version,
                message: "Template created successfully",
            },
        }),
    ))
}

/// GET /api/v1/templates
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<TemplateWithLatest<TemplateVersionSummary>>>>> {
    let templates = TemplateService::list(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: templates }))
}

/// GET /api/v1/templates/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TemplateWithLatest<TemplateVersion>>>> {
    let template = TemplateService::get(&state.pool, auth.user_id, id).await?;
    Ok(Json(DataResponse { data: template }))
}

/// DELETE /api/v1/templates/{id}
///
/// Removes the template and its entire version history.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    TemplateService::delete(&state.pool, auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/templates/{id}/metadata
///
/// Absent fields keep their stored values. Versions are never touched.
pub async fn update_metadata(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTemplateMetadata>,
) -> AppResult<Json<DataResponse<Template>>> {
    let template = TemplateService::update_metadata(&state.pool, auth.user_id, id, &input).await?;
    Ok(Json(DataResponse { data: template }))
}

/// POST /api/v1/templates/{id}/versions
///
/// The request body is the new payload itself.
pub async fn add_version(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(data): Json<serde_json::Value>,
) -> AppResult<(StatusCode, Json<DataResponse<AddVersionResponse>>)> {
    let version = TemplateService::add_version(&state.pool, auth.user_id, id, &data).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: AddVersionResponse {
                version: version.version,
            },
        }),
    ))
}

/// GET /api/v1/templates/{id}/versions
pub async fn list_versions(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TemplateVersionList>>> {
    let versions = TemplateService::list_versions(&state.pool, auth.user_id, id).await?;
    Ok(Json(DataResponse { data: versions }))
}

/// GET /api/v1/templates/{id}/versions/{version_id}
pub async fn get_version(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, version_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<TemplateVersion>>> {
    let version = TemplateService::get_version(&state.pool, auth.user_id, id, version_id).await?;
    Ok(Json(DataResponse { data: version }))
}

/// GET /api/v1/templates/{id}/history
pub async fn verify_history(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<HistoryReport>>> {
    let report = TemplateService::verify_history(&state.pool, auth.user_id, id).await?;
    Ok(Json(DataResponse { data: report }))
}
