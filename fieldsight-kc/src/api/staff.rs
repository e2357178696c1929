//! Staff endpoints: `GET|POST /staff/staff`, `GET|PUT|DELETE /staff/staff/:id`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use fieldsight_common::db::Staff;
use tracing::info;

use super::{require_reference, require_text};
use crate::db::staff::{self, StaffForm};
use crate::db::ReferenceTable;
use crate::{ApiError, ApiResult, AppState};

pub async fn list_staff(State(state): State<AppState>) -> ApiResult<Json<Vec<Staff>>> {
    Ok(Json(staff::list_active_staff(&state.db).await?))
}

pub async fn get_staff(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Staff>> {
    let member = staff::get_staff(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Staff {}", id)))?;
    Ok(Json(member))
}

pub async fn create_staff(
    State(state): State<AppState>,
    Json(form): Json<StaffForm>,
) -> ApiResult<(StatusCode, Json<Staff>)> {
    validate(&state, &form).await?;
    let member = staff::create_staff(&state.db, &form).await?;
    info!(staff_id = member.id, team_id = ?member.team_id, "Staff created");

    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn update_staff(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<StaffForm>,
) -> ApiResult<Json<Staff>> {
    validate(&state, &form).await?;
    let member = staff::update_staff(&state.db, id, &form)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Staff {}", id)))?;
    info!(staff_id = id, "Staff updated");

    Ok(Json(member))
}

pub async fn delete_staff(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if !staff::delete_staff(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Staff {}", id)));
    }
    info!(staff_id = id, "Staff deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn validate(state: &AppState, form: &StaffForm) -> ApiResult<()> {
    require_text("first_name", &form.first_name)?;
    require_text("last_name", &form.last_name)?;
    require_reference(&state.db, "team_id", ReferenceTable::Teams, form.team_id).await?;
    require_reference(&state.db, "created_by", ReferenceTable::Users, form.created_by).await
}

/// Build staff routes
pub fn staff_routes() -> Router<AppState> {
    Router::new()
        .route("/staff/staff", get(list_staff).post(create_staff))
        .route(
            "/staff/staff/:id",
            get(get_staff).put(update_staff).delete(delete_staff),
        )
}
