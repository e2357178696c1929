//! Team endpoints
//!
//! `GET|POST /staff/teams`, `GET|PUT|DELETE /staff/teams/:id`.
//! Deleting only flags the team; the detail view still resolves afterwards.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use fieldsight_common::db::{Staff, Team};
use serde::Serialize;
use tracing::info;

use super::{require_reference, require_text};
use crate::db::teams::{self, TeamForm};
use crate::db::{staff, ReferenceTable};
use crate::{ApiError, ApiResult, AppState};

/// Team with its members
#[derive(Debug, Serialize)]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: Team,
    pub staff_list: Vec<Staff>,
}

/// GET /staff/teams
pub async fn list_teams(State(state): State<AppState>) -> ApiResult<Json<Vec<Team>>> {
    Ok(Json(teams::list_active_teams(&state.db).await?))
}

/// GET /staff/teams/:id
pub async fn get_team(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TeamDetail>> {
    let team = teams::get_team(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Team {}", id)))?;
    let staff_list = staff::list_staff_for_team(&state.db, id).await?;

    Ok(Json(TeamDetail { team, staff_list }))
}

/// POST /staff/teams
pub async fn create_team(
    State(state): State<AppState>,
    Json(form): Json<TeamForm>,
) -> ApiResult<(StatusCode, Json<Team>)> {
    validate(&state, &form).await?;
    let team = teams::create_team(&state.db, &form).await?;
    info!(team_id = team.id, "Team created");

    Ok((StatusCode::CREATED, Json(team)))
}

/// PUT /staff/teams/:id
pub async fn update_team(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<TeamForm>,
) -> ApiResult<Json<Team>> {
    validate(&state, &form).await?;
    let team = teams::update_team(&state.db, id, &form)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Team {}", id)))?;
    info!(team_id = id, "Team updated");

    Ok(Json(team))
}

/// DELETE /staff/teams/:id
pub async fn delete_team(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if !teams::delete_team(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Team {}", id)));
    }
    info!(team_id = id, "Team deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn validate(state: &AppState, form: &TeamForm) -> ApiResult<()> {
    require_text("name", &form.name)?;
    require_reference(&state.db, "leader_id", ReferenceTable::Users, form.leader_id).await?;
    require_reference(&state.db, "created_by", ReferenceTable::Users, form.created_by).await?;
    require_reference(
        &state.db,
        "staff_project_id",
        ReferenceTable::StaffProjects,
        form.staff_project_id,
    )
    .await
}

/// Build team routes
pub fn team_routes() -> Router<AppState> {
    Router::new()
        .route("/staff/teams", get(list_teams).post(create_team))
        .route(
            "/staff/teams/:id",
            get(get_team).put(update_team).delete(delete_team),
        )
}
