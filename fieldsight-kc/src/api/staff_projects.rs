//! Staff project endpoints
//!
//! `GET|POST /staff/projects`, `GET|PUT|DELETE /staff/projects/:id`.
//! The detail view lists every team attached to the project.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use fieldsight_common::db::{StaffProject, Team};
use serde::Serialize;
use tracing::info;

use super::{require_reference, require_text};
use crate::db::staff_projects::{self, StaffProjectForm};
use crate::db::{teams, ReferenceTable};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct StaffProjectDetail {
    #[serde(flatten)]
    pub project: StaffProject,
    pub team_list: Vec<Team>,
}

pub async fn list_staff_projects(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<StaffProject>>> {
    Ok(Json(staff_projects::list_active_staff_projects(&state.db).await?))
}

pub async fn get_staff_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<StaffProjectDetail>> {
    let project = staff_projects::get_staff_project(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Staff project {}", id)))?;
    let team_list = teams::list_teams_for_staff_project(&state.db, id).await?;

    Ok(Json(StaffProjectDetail { project, team_list }))
}

pub async fn create_staff_project(
    State(state): State<AppState>,
    Json(form): Json<StaffProjectForm>,
) -> ApiResult<(StatusCode, Json<StaffProject>)> {
    validate(&state, &form).await?;
    let project = staff_projects::create_staff_project(&state.db, &form).await?;
    info!(staff_project_id = project.id, "Staff project created");

    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn update_staff_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<StaffProjectForm>,
) -> ApiResult<Json<StaffProject>> {
    validate(&state, &form).await?;
    let project = staff_projects::update_staff_project(&state.db, id, &form)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Staff project {}", id)))?;
    info!(staff_project_id = id, "Staff project updated");

    Ok(Json(project))
}

pub async fn delete_staff_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if !staff_projects::delete_staff_project(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Staff project {}", id)));
    }
    info!(staff_project_id = id, "Staff project deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn validate(state: &AppState, form: &StaffProjectForm) -> ApiResult<()> {
    require_text("name", &form.name)?;
    require_reference(&state.db, "created_by", ReferenceTable::Users, form.created_by).await
}

/// Build staff project routes
pub fn staff_project_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/staff/projects",
            get(list_staff_projects).post(create_staff_project),
        )
        .route(
            "/staff/projects/:id",
            get(get_staff_project)
                .put(update_staff_project)
                .delete(delete_staff_project),
        )
}
