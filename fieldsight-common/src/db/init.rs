//! Database initialization
//!
//! Opens (or creates) the SQLite database and creates every table the service
//! uses. All statements are `IF NOT EXISTS`, so startup is idempotent.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Per-connection pragmas: every pooled connection gets them, not only the
    // first one to run a statement
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables on an open pool
///
/// Also enables foreign keys on the connection that runs the statements, for
/// pools not opened through [`init_database`] (in-memory test pools).
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await?;

    create_users_table(pool).await?;
    create_staff_projects_table(pool).await?;
    create_teams_table(pool).await?;
    create_staff_table(pool).await?;
    create_xforms_table(pool).await?;
    create_instances_table(pool).await?;
    create_attachments_table(pool).await?;
    create_finstances_table(pool).await?;
    create_instance_status_changes_table(pool).await?;

    Ok(())
}

pub async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_staff_projects_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS staff_projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            created_by INTEGER REFERENCES users(id) ON DELETE SET NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_teams_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teams (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            leader_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
            name TEXT NOT NULL,
            created_by INTEGER REFERENCES users(id) ON DELETE SET NULL,
            staff_project_id INTEGER REFERENCES staff_projects(id) ON DELETE SET NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_teams_staff_project ON teams(staff_project_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_staff_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS staff (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            team_id INTEGER REFERENCES teams(id) ON DELETE SET NULL,
            gender TEXT,
            ethnicity TEXT,
            address TEXT,
            phone_number TEXT,
            bank_name TEXT,
            account_number TEXT,
            photo TEXT,
            designation TEXT,
            created_by INTEGER REFERENCES users(id) ON DELETE SET NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_staff_team ON staff(team_id)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_xforms_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS xforms (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            id_string TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL DEFAULT '',
            user_id INTEGER NOT NULL REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_instances_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS instances (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            xform_id INTEGER NOT NULL REFERENCES xforms(id) ON DELETE CASCADE,
            uuid TEXT NOT NULL,
            xml TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_instances_xform ON instances(xform_id)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_attachments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attachments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            instance_id INTEGER NOT NULL REFERENCES instances(id) ON DELETE CASCADE,
            media_file TEXT NOT NULL,
            mimetype TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_attachments_instance ON attachments(instance_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_finstances_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS finstances (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            instance_id INTEGER NOT NULL REFERENCES instances(id) ON DELETE CASCADE,
            site_id INTEGER,
            project_id INTEGER,
            site_fxf_id INTEGER,
            project_fxf_id INTEGER,
            form_status INTEGER NOT NULL DEFAULT 0,
            submitted_by INTEGER REFERENCES users(id) ON DELETE SET NULL,
            date TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_finstances_site_fxf ON finstances(site_fxf_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_finstances_instance ON finstances(instance_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_instance_status_changes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS instance_status_changes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            finstance_id INTEGER NOT NULL REFERENCES finstances(id) ON DELETE CASCADE,
            message TEXT NOT NULL DEFAULT '',
            old_status INTEGER NOT NULL DEFAULT 0,
            new_status INTEGER NOT NULL DEFAULT 0,
            user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
            date TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_status_changes_finstance ON instance_status_changes(finstance_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
