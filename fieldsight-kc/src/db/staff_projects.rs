//! Staff project database operations

use anyhow::Result;
use chrono::Utc;
use fieldsight_common::db::StaffProject;
use serde::Deserialize;
use sqlx::SqlitePool;

use super::{soft_delete, SoftDeleteTable};

const COLUMNS: &str = "id, name, created_by, is_deleted, created_at";

/// Editable staff project fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffProjectForm {
    pub name: String,
    #[serde(default)]
    pub created_by: Option<i64>,
}

/// Staff projects not flagged as deleted, newest first
pub async fn list_active_staff_projects(pool: &SqlitePool) -> Result<Vec<StaffProject>> {
    let sql = format!(
        "SELECT {} FROM staff_projects WHERE is_deleted = 0 ORDER BY created_at DESC, id DESC",
        COLUMNS
    );
    let projects = sqlx::query_as::<_, StaffProject>(&sql).fetch_all(pool).await?;
    Ok(projects)
}

/// Load a staff project by id, deleted or not
pub async fn get_staff_project(pool: &SqlitePool, id: i64) -> Result<Option<StaffProject>> {
    let sql = format!("SELECT {} FROM staff_projects WHERE id = ?", COLUMNS);
    let project = sqlx::query_as::<_, StaffProject>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(project)
}

pub async fn create_staff_project(pool: &SqlitePool, form: &StaffProjectForm) -> Result<StaffProject> {
    let sql = format!(
        "INSERT INTO staff_projects (name, created_by, is_deleted, created_at) \
         VALUES (?, ?, 0, ?) RETURNING {}",
        COLUMNS
    );
    let project = sqlx::query_as::<_, StaffProject>(&sql)
        .bind(&form.name)
        .bind(form.created_by)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;
    Ok(project)
}

/// Update the editable fields; `None` when the row does not exist
pub async fn update_staff_project(
    pool: &SqlitePool,
    id: i64,
    form: &StaffProjectForm,
) -> Result<Option<StaffProject>> {
    let sql = format!(
        "UPDATE staff_projects SET name = ?, created_by = ? WHERE id = ? RETURNING {}",
        COLUMNS
    );
    let project = sqlx::query_as::<_, StaffProject>(&sql)
        .bind(&form.name)
        .bind(form.created_by)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(project)
}

pub async fn delete_staff_project(pool: &SqlitePool, id: i64) -> Result<bool> {
    soft_delete(pool, SoftDeleteTable::StaffProjects, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::setup_pool;

    fn form(name: &str) -> StaffProjectForm {
        StaffProjectForm {
            name: name.to_string(),
            created_by: None,
        }
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let pool = setup_pool().await;

        let project = create_staff_project(&pool, &form("Survey 2024")).await.unwrap();
        assert_eq!(project.name, "Survey 2024");
        assert!(!project.is_deleted);

        let updated = update_staff_project(&pool, project.id, &form("Survey 2025"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Survey 2025");
        assert_eq!(updated.created_at, project.created_at);

        assert!(delete_staff_project(&pool, project.id).await.unwrap());
        assert!(list_active_staff_projects(&pool).await.unwrap().is_empty());

        let deleted = get_staff_project(&pool, project.id).await.unwrap().unwrap();
        assert!(deleted.is_deleted);
    }

    #[tokio::test]
    async fn test_update_missing_project() {
        let pool = setup_pool().await;
        assert!(update_staff_project(&pool, 9, &form("x")).await.unwrap().is_none());
    }
}
