//! User lookups

use anyhow::Result;
use fieldsight_common::db::User;
use sqlx::SqlitePool;

pub async fn create_user(pool: &SqlitePool, username: &str) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username) VALUES (?) RETURNING id, username",
    )
    .bind(username)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::setup_pool;

    #[tokio::test]
    async fn test_create_and_get_user() {
        let pool = setup_pool().await;

        let user = create_user(&pool, "alice").await.unwrap();
        let loaded = get_user(&pool, user.id).await.unwrap().unwrap();

        assert_eq!(loaded.username, "alice");
        assert!(get_user(&pool, user.id + 1).await.unwrap().is_none());
        assert!(create_user(&pool, "alice").await.is_err());
    }
}
