//! Attachment database operations

use anyhow::Result;
use fieldsight_common::db::Attachment;
use sqlx::SqlitePool;

pub async fn create_attachment(
    pool: &SqlitePool,
    instance_id: i64,
    media_file: &str,
    mimetype: &str,
) -> Result<Attachment> {
    let attachment = sqlx::query_as::<_, Attachment>(
        "INSERT INTO attachments (instance_id, media_file, mimetype) VALUES (?, ?, ?) \
         RETURNING id, instance_id, media_file, mimetype",
    )
    .bind(instance_id)
    .bind(media_file)
    .bind(mimetype)
    .fetch_one(pool)
    .await?;

    Ok(attachment)
}

pub async fn list_attachments_for_instance(pool: &SqlitePool, instance_id: i64) -> Result<Vec<Attachment>> {
    let attachments = sqlx::query_as::<_, Attachment>(
        "SELECT id, instance_id, media_file, mimetype FROM attachments \
         WHERE instance_id = ? ORDER BY id",
    )
    .bind(instance_id)
    .fetch_all(pool)
    .await?;

    Ok(attachments)
}

/// Attachments of every instance of a form, grouped by instance
pub async fn list_attachments_for_xform(pool: &SqlitePool, xform_id: i64) -> Result<Vec<Attachment>> {
    let attachments = sqlx::query_as::<_, Attachment>(
        r#"
        SELECT a.id, a.instance_id, a.media_file, a.mimetype
        FROM attachments a
        JOIN instances i ON i.id = a.instance_id
        WHERE i.xform_id = ?
        ORDER BY a.instance_id, a.id
        "#,
    )
    .bind(xform_id)
    .fetch_all(pool)
    .await?;

    Ok(attachments)
}
