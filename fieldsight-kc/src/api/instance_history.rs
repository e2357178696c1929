//! Instance review history endpoints
//!
//! - `GET /fsforms/api/instance/history/:instance_id`: status changes of an instance
//! - `GET /fsforms/api/instance/change/:id`: one status change
//! - `GET /fsforms/api/instance/responses/:site_fxf_id?page=N`: paginated responses
//! - `POST /fsforms/api/instance/status/:finstance_id`: record a review decision

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use fieldsight_common::db::FormStatus;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::history::{self, FInstanceRow, StatusChangeRow};
use crate::api::require_reference;
use crate::db::ReferenceTable;
use crate::pagination::{calculate_pagination, Page, PageQuery, PAGE_SIZE};
use crate::{ApiError, ApiResult, AppState};

/// Serialized status change
#[derive(Debug, Serialize)]
pub struct StatusChangeResponse {
    pub id: i64,
    pub finstance: i64,
    pub instance: i64,
    pub message: String,
    pub old_status: i64,
    pub old_status_display: &'static str,
    pub new_status: i64,
    pub new_status_display: &'static str,
    pub user: Option<i64>,
    pub user_name: Option<String>,
    pub date: DateTime<Utc>,
}

impl From<StatusChangeRow> for StatusChangeResponse {
    fn from(row: StatusChangeRow) -> Self {
        Self {
            id: row.id,
            finstance: row.finstance_id,
            instance: row.instance_id,
            message: row.message,
            old_status: row.old_status,
            old_status_display: FormStatus::label_for(row.old_status),
            new_status: row.new_status,
            new_status_display: FormStatus::label_for(row.new_status),
            user: row.user_id,
            user_name: row.user_name,
            date: row.date,
        }
    }
}

/// Serialized site form response
#[derive(Debug, Serialize)]
pub struct ResponseSummary {
    pub id: i64,
    pub instance: i64,
    pub site: Option<i64>,
    pub project: Option<i64>,
    pub site_fxf: Option<i64>,
    pub project_fxf: Option<i64>,
    pub form_status: i64,
    pub form_status_display: &'static str,
    pub submitted_by: Option<i64>,
    pub submitted_by_name: Option<String>,
    pub date: DateTime<Utc>,
}

impl From<FInstanceRow> for ResponseSummary {
    fn from(row: FInstanceRow) -> Self {
        Self {
            id: row.id,
            instance: row.instance_id,
            site: row.site_id,
            project: row.project_id,
            site_fxf: row.site_fxf_id,
            project_fxf: row.project_fxf_id,
            form_status: row.form_status,
            form_status_display: FormStatus::label_for(row.form_status),
            submitted_by: row.submitted_by,
            submitted_by_name: row.submitted_by_name,
            date: row.date,
        }
    }
}

pub async fn instance_history(
    State(state): State<AppState>,
    Path(instance_id): Path<i64>,
) -> ApiResult<Json<Vec<StatusChangeResponse>>> {
    let changes = history::list_status_changes_for_instance(&state.db, instance_id).await?;
    Ok(Json(changes.into_iter().map(Into::into).collect()))
}

pub async fn status_change(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<StatusChangeResponse>> {
    let change = history::get_status_change(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Status change {}", id)))?;
    Ok(Json(change.into()))
}

pub async fn site_form_responses(
    State(state): State<AppState>,
    Path(site_fxf_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<ResponseSummary>>> {
    let count = history::count_finstances_for_site_fxf(&state.db, site_fxf_id).await?;
    let pagination = calculate_pagination(count, query.page.unwrap_or(1))
        .ok_or_else(|| ApiError::NotFound("Invalid page.".to_string()))?;

    let rows =
        history::list_finstances_for_site_fxf(&state.db, site_fxf_id, PAGE_SIZE, pagination.offset)
            .await?;
    let results = rows.into_iter().map(Into::into).collect();

    Ok(Json(Page::new(count, pagination, results)))
}

/// Review decision on a FieldSight instance
#[derive(Debug, Deserialize)]
pub struct StatusChangeForm {
    pub new_status: i64,
    #[serde(default)]
    pub message: String,
    pub user: Option<i64>,
}

pub async fn change_status(
    State(state): State<AppState>,
    Path(finstance_id): Path<i64>,
    Json(form): Json<StatusChangeForm>,
) -> ApiResult<(StatusCode, Json<StatusChangeResponse>)> {
    if FormStatus::from_code(form.new_status).is_none() {
        return Err(ApiError::BadRequest(format!(
            "Unknown form status {}",
            form.new_status
        )));
    }
    history::get_finstance(&state.db, finstance_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Response {}", finstance_id)))?;
    require_reference(&state.db, "user", ReferenceTable::Users, form.user).await?;

    let change = history::record_status_change(
        &state.db,
        finstance_id,
        form.new_status,
        &form.message,
        form.user,
    )
    .await?;
    info!(
        finstance_id,
        old_status = change.old_status,
        new_status = change.new_status,
        "Review status changed"
    );

    let row = history::get_status_change(&state.db, change.id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("Status change {} vanished", change.id)))?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// Build instance history routes
pub fn instance_history_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/fsforms/api/instance/history/:instance_id",
            get(instance_history),
        )
        .route("/fsforms/api/instance/change/:id", get(status_change))
        .route(
            "/fsforms/api/instance/responses/:site_fxf_id",
            get(site_form_responses),
        )
        .route(
            "/fsforms/api/instance/status/:finstance_id",
            post(change_status),
        )
}
