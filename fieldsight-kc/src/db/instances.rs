//! Instance database operations

use anyhow::Result;
use chrono::Utc;
use fieldsight_common::db::Instance;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, xform_id, uuid, xml, created_at";

pub async fn create_instance(pool: &SqlitePool, xform_id: i64, uuid: &str, xml: &str) -> Result<Instance> {
    let sql = format!(
        "INSERT INTO instances (xform_id, uuid, xml, created_at) VALUES (?, ?, ?, ?) RETURNING {}",
        COLUMNS
    );
    let instance = sqlx::query_as::<_, Instance>(&sql)
        .bind(xform_id)
        .bind(uuid)
        .bind(xml)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;
    Ok(instance)
}

pub async fn get_instance(pool: &SqlitePool, id: i64) -> Result<Option<Instance>> {
    let sql = format!("SELECT {} FROM instances WHERE id = ?", COLUMNS);
    let instance = sqlx::query_as::<_, Instance>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(instance)
}
