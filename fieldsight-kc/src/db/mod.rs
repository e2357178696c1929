//! Database access for fieldsight-kc

pub mod attachments;
pub mod history;
pub mod instances;
pub mod staff;
pub mod staff_projects;
pub mod teams;
pub mod users;
pub mod xforms;

use anyhow::Result;
use sqlx::SqlitePool;

/// Tables supporting the `is_deleted` flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftDeleteTable {
    StaffProjects,
    Teams,
    Staff,
}

impl SoftDeleteTable {
    fn name(self) -> &'static str {
        match self {
            Self::StaffProjects => "staff_projects",
            Self::Teams => "teams",
            Self::Staff => "staff",
        }
    }
}

/// Tables referenced by foreign keys in form input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceTable {
    Users,
    StaffProjects,
    Teams,
}

impl ReferenceTable {
    fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::StaffProjects => "staff_projects",
            Self::Teams => "teams",
        }
    }
}

/// Flag a row as deleted; returns false when no row has this id
pub async fn soft_delete(pool: &SqlitePool, table: SoftDeleteTable, id: i64) -> Result<bool> {
    let sql = format!("UPDATE {} SET is_deleted = 1 WHERE id = ?", table.name());
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn row_exists(pool: &SqlitePool, table: ReferenceTable, id: i64) -> Result<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", table.name());
    let exists: bool = sqlx::query_scalar(&sql).bind(id).fetch_one(pool).await?;
    Ok(exists)
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    /// Single-connection in-memory database with the full schema
    pub async fn setup_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        fieldsight_common::db::create_schema(&pool)
            .await
            .expect("Failed to create schema");
        pool
    }

    pub async fn insert_user(pool: &SqlitePool, username: &str) -> i64 {
        super::users::create_user(pool, username)
            .await
            .expect("Failed to create user")
            .id
    }
}
