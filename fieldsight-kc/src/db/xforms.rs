//! XForm lookups

use anyhow::Result;
use fieldsight_common::db::XForm;
use sqlx::SqlitePool;

/// Form together with its owner's username
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct XFormWithOwner {
    pub id: i64,
    pub id_string: String,
    pub title: String,
    pub user_id: i64,
    pub username: String,
}

pub async fn create_xform(pool: &SqlitePool, id_string: &str, title: &str, user_id: i64) -> Result<XForm> {
    let xform = sqlx::query_as::<_, XForm>(
        "INSERT INTO xforms (id_string, title, user_id) VALUES (?, ?, ?) \
         RETURNING id, id_string, title, user_id",
    )
    .bind(id_string)
    .bind(title)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(xform)
}

pub async fn get_xform(pool: &SqlitePool, id: i64) -> Result<Option<XForm>> {
    let xform = sqlx::query_as::<_, XForm>(
        "SELECT id, id_string, title, user_id FROM xforms WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(xform)
}

pub async fn get_xform_by_id_string(pool: &SqlitePool, id_string: &str) -> Result<Option<XForm>> {
    let xform = sqlx::query_as::<_, XForm>(
        "SELECT id, id_string, title, user_id FROM xforms WHERE id_string = ?",
    )
    .bind(id_string)
    .fetch_optional(pool)
    .await?;

    Ok(xform)
}

pub async fn get_xform_with_owner(pool: &SqlitePool, id: i64) -> Result<Option<XFormWithOwner>> {
    let xform = sqlx::query_as::<_, XFormWithOwner>(
        r#"
        SELECT x.id, x.id_string, x.title, x.user_id, u.username
        FROM xforms x
        JOIN users u ON u.id = x.user_id
        WHERE x.id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(xform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{insert_user, setup_pool};

    #[tokio::test]
    async fn test_xform_lookups() {
        let pool = setup_pool().await;
        let owner = insert_user(&pool, "bob").await;

        let xform = create_xform(&pool, "household", "Household survey", owner)
            .await
            .unwrap();

        let by_string = get_xform_by_id_string(&pool, "household").await.unwrap().unwrap();
        assert_eq!(by_string.id, xform.id);
        assert!(get_xform_by_id_string(&pool, "unknown").await.unwrap().is_none());

        let with_owner = get_xform_with_owner(&pool, xform.id).await.unwrap().unwrap();
        assert_eq!(with_owner.username, "bob");
        assert_eq!(get_xform(&pool, xform.id).await.unwrap(), Some(xform));
    }
}
