//! HTTP API handlers

pub mod health;
pub mod instance_history;
pub mod instances;
pub mod staff;
pub mod staff_projects;
pub mod teams;

pub use health::health_routes;
pub use instance_history::instance_history_routes;
pub use instances::instance_routes;
pub use staff::staff_routes;
pub use staff_projects::staff_project_routes;
pub use teams::team_routes;

use crate::db::{row_exists, ReferenceTable};
use crate::{ApiError, ApiResult};
use sqlx::SqlitePool;

/// Reject blank required text fields
pub(crate) fn require_text(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required", field)));
    }
    Ok(())
}

/// Reject foreign keys pointing at missing rows
pub(crate) async fn require_reference(
    pool: &SqlitePool,
    field: &str,
    table: ReferenceTable,
    id: Option<i64>,
) -> ApiResult<()> {
    if let Some(id) = id {
        if !row_exists(pool, table, id).await? {
            return Err(ApiError::BadRequest(format!("{} {} does not exist", field, id)));
        }
    }
    Ok(())
}
