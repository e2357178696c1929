//! Staff database operations

use anyhow::Result;
use chrono::Utc;
use fieldsight_common::db::Staff;
use serde::Deserialize;
use sqlx::SqlitePool;

use super::{soft_delete, SoftDeleteTable};

const COLUMNS: &str = "id, first_name, last_name, team_id, gender, ethnicity, address, \
                       phone_number, bank_name, account_number, photo, designation, \
                       created_by, is_deleted, created_at";

/// Editable staff fields
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StaffForm {
    pub first_name: String,
    pub last_name: String,
    pub team_id: Option<i64>,
    pub gender: Option<String>,
    pub ethnicity: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub photo: Option<String>,
    pub designation: Option<String>,
    pub created_by: Option<i64>,
}

/// Staff not flagged as deleted, newest first
pub async fn list_active_staff(pool: &SqlitePool) -> Result<Vec<Staff>> {
    let sql = format!(
        "SELECT {} FROM staff WHERE is_deleted = 0 ORDER BY created_at DESC, id DESC",
        COLUMNS
    );
    let staff = sqlx::query_as::<_, Staff>(&sql).fetch_all(pool).await?;
    Ok(staff)
}

/// Load a staff member by id, deleted or not
pub async fn get_staff(pool: &SqlitePool, id: i64) -> Result<Option<Staff>> {
    let sql = format!("SELECT {} FROM staff WHERE id = ?", COLUMNS);
    let staff = sqlx::query_as::<_, Staff>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(staff)
}

/// All staff of a team, including deleted ones
pub async fn list_staff_for_team(pool: &SqlitePool, team_id: i64) -> Result<Vec<Staff>> {
    let sql = format!("SELECT {} FROM staff WHERE team_id = ? ORDER BY id", COLUMNS);
    let staff = sqlx::query_as::<_, Staff>(&sql)
        .bind(team_id)
        .fetch_all(pool)
        .await?;
    Ok(staff)
}

pub async fn create_staff(pool: &SqlitePool, form: &StaffForm) -> Result<Staff> {
    let sql = format!(
        "INSERT INTO staff (first_name, last_name, team_id, gender, ethnicity, address, \
         phone_number, bank_name, account_number, photo, designation, created_by, \
         is_deleted, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?) RETURNING {}",
        COLUMNS
    );
    let staff = sqlx::query_as::<_, Staff>(&sql)
        .bind(&form.first_name)
        .bind(&form.last_name)
        .bind(form.team_id)
        .bind(&form.gender)
        .bind(&form.ethnicity)
        .bind(&form.address)
        .bind(&form.phone_number)
        .bind(&form.bank_name)
        .bind(&form.account_number)
        .bind(&form.photo)
        .bind(&form.designation)
        .bind(form.created_by)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;
    Ok(staff)
}

/// Update the editable fields; `None` when the row does not exist
pub async fn update_staff(pool: &SqlitePool, id: i64, form: &StaffForm) -> Result<Option<Staff>> {
    let sql = format!(
        "UPDATE staff SET first_name = ?, last_name = ?, team_id = ?, gender = ?, \
         ethnicity = ?, address = ?, phone_number = ?, bank_name = ?, account_number = ?, \
         photo = ?, designation = ?, created_by = ? \
         WHERE id = ? RETURNING {}",
        COLUMNS
    );
    let staff = sqlx::query_as::<_, Staff>(&sql)
        .bind(&form.first_name)
        .bind(&form.last_name)
        .bind(form.team_id)
        .bind(&form.gender)
        .bind(&form.ethnicity)
        .bind(&form.address)
        .bind(&form.phone_number)
        .bind(&form.bank_name)
        .bind(&form.account_number)
        .bind(&form.photo)
        .bind(&form.designation)
        .bind(form.created_by)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(staff)
}

pub async fn delete_staff(pool: &SqlitePool, id: i64) -> Result<bool> {
    soft_delete(pool, SoftDeleteTable::Staff, id).await
}
