//! Team database operations

use anyhow::Result;
use chrono::Utc;
use fieldsight_common::db::Team;
use serde::Deserialize;
use sqlx::SqlitePool;

use super::{soft_delete, SoftDeleteTable};

const COLUMNS: &str = "id, leader_id, name, created_by, staff_project_id, is_deleted, created_at";

/// Editable team fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamForm {
    pub name: String,
    #[serde(default)]
    pub leader_id: Option<i64>,
    #[serde(default)]
    pub staff_project_id: Option<i64>,
    #[serde(default)]
    pub created_by: Option<i64>,
}

/// Teams not flagged as deleted, newest first
pub async fn list_active_teams(pool: &SqlitePool) -> Result<Vec<Team>> {
    let sql = format!(
        "SELECT {} FROM teams WHERE is_deleted = 0 ORDER BY created_at DESC, id DESC",
        COLUMNS
    );
    let teams = sqlx::query_as::<_, Team>(&sql).fetch_all(pool).await?;
    Ok(teams)
}

/// Load a team by id, deleted or not
pub async fn get_team(pool: &SqlitePool, id: i64) -> Result<Option<Team>> {
    let sql = format!("SELECT {} FROM teams WHERE id = ?", COLUMNS);
    let team = sqlx::query_as::<_, Team>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(team)
}

/// All teams of a staff project, including deleted ones
pub async fn list_teams_for_staff_project(pool: &SqlitePool, staff_project_id: i64) -> Result<Vec<Team>> {
    let sql = format!(
        "SELECT {} FROM teams WHERE staff_project_id = ? ORDER BY id",
        COLUMNS
    );
    let teams = sqlx::query_as::<_, Team>(&sql)
        .bind(staff_project_id)
        .fetch_all(pool)
        .await?;
    Ok(teams)
}

pub async fn create_team(pool: &SqlitePool, form: &TeamForm) -> Result<Team> {
    let sql = format!(
        "INSERT INTO teams (leader_id, name, created_by, staff_project_id, is_deleted, created_at) \
         VALUES (?, ?, ?, ?, 0, ?) RETURNING {}",
        COLUMNS
    );
    let team = sqlx::query_as::<_, Team>(&sql)
        .bind(form.leader_id)
        .bind(&form.name)
        .bind(form.created_by)
        .bind(form.staff_project_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;
    Ok(team)
}

/// Update the editable fields; `None` when the row does not exist
pub async fn update_team(pool: &SqlitePool, id: i64, form: &TeamForm) -> Result<Option<Team>> {
    let sql = format!(
        "UPDATE teams SET leader_id = ?, name = ?, created_by = ?, staff_project_id = ? \
         WHERE id = ? RETURNING {}",
        COLUMNS
    );
    let team = sqlx::query_as::<_, Team>(&sql)
        .bind(form.leader_id)
        .bind(&form.name)
        .bind(form.created_by)
        .bind(form.staff_project_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(team)
}

pub async fn delete_team(pool: &SqlitePool, id: i64) -> Result<bool> {
    soft_delete(pool, SoftDeleteTable::Teams, id).await
}
