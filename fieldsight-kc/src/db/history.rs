//! Instance review history
//!
//! FieldSight wrappers around submitted instances: review status changes and
//! the per-site-form response listing.

use anyhow::Result;
use chrono::{DateTime, Utc};
use fieldsight_common::db::{FInstance, InstanceStatusChange};
use sqlx::SqlitePool;

/// Status change joined with the reviewing user's name
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StatusChangeRow {
    pub id: i64,
    pub finstance_id: i64,
    pub instance_id: i64,
    pub message: String,
    pub old_status: i64,
    pub new_status: i64,
    pub user_id: Option<i64>,
    pub user_name: Option<String>,
    pub date: DateTime<Utc>,
}

/// FieldSight instance joined with the submitter's name
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FInstanceRow {
    pub id: i64,
    pub instance_id: i64,
    pub site_id: Option<i64>,
    pub project_id: Option<i64>,
    pub site_fxf_id: Option<i64>,
    pub project_fxf_id: Option<i64>,
    pub form_status: i64,
    pub submitted_by: Option<i64>,
    pub submitted_by_name: Option<String>,
    pub date: DateTime<Utc>,
}

/// Fields of a new FieldSight instance
#[derive(Debug, Clone, Default)]
pub struct NewFInstance {
    pub instance_id: i64,
    pub site_id: Option<i64>,
    pub project_id: Option<i64>,
    pub site_fxf_id: Option<i64>,
    pub project_fxf_id: Option<i64>,
    pub form_status: i64,
    pub submitted_by: Option<i64>,
}

const STATUS_CHANGE_SELECT: &str = r#"
    SELECT c.id, c.finstance_id, f.instance_id, c.message, c.old_status, c.new_status,
           c.user_id, u.username AS user_name, c.date
    FROM instance_status_changes c
    JOIN finstances f ON f.id = c.finstance_id
    LEFT JOIN users u ON u.id = c.user_id
"#;

/// Status changes of every FieldSight wrapper of an instance, oldest first
pub async fn list_status_changes_for_instance(
    pool: &SqlitePool,
    instance_id: i64,
) -> Result<Vec<StatusChangeRow>> {
    let sql = format!(
        "{} WHERE f.instance_id = ? ORDER BY c.date, c.id",
        STATUS_CHANGE_SELECT
    );
    let changes = sqlx::query_as::<_, StatusChangeRow>(&sql)
        .bind(instance_id)
        .fetch_all(pool)
        .await?;
    Ok(changes)
}

pub async fn get_status_change(pool: &SqlitePool, id: i64) -> Result<Option<StatusChangeRow>> {
    let sql = format!("{} WHERE c.id = ?", STATUS_CHANGE_SELECT);
    let change = sqlx::query_as::<_, StatusChangeRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(change)
}

pub async fn count_finstances_for_site_fxf(pool: &SqlitePool, site_fxf_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM finstances WHERE site_fxf_id = ?")
        .bind(site_fxf_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// One page of responses for a site form, newest first
pub async fn list_finstances_for_site_fxf(
    pool: &SqlitePool,
    site_fxf_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<FInstanceRow>> {
    let rows = sqlx::query_as::<_, FInstanceRow>(
        r#"
        SELECT f.id, f.instance_id, f.site_id, f.project_id, f.site_fxf_id, f.project_fxf_id,
               f.form_status, f.submitted_by, u.username AS submitted_by_name, f.date
        FROM finstances f
        LEFT JOIN users u ON u.id = f.submitted_by
        WHERE f.site_fxf_id = ?
        ORDER BY f.date DESC, f.id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(site_fxf_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_finstance(pool: &SqlitePool, id: i64) -> Result<Option<FInstance>> {
    let finstance = sqlx::query_as::<_, FInstance>(
        "SELECT id, instance_id, site_id, project_id, site_fxf_id, project_fxf_id, \
         form_status, submitted_by, date FROM finstances WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(finstance)
}

pub async fn create_finstance(pool: &SqlitePool, new: &NewFInstance) -> Result<FInstance> {
    let finstance = sqlx::query_as::<_, FInstance>(
        r#"
        INSERT INTO finstances (instance_id, site_id, project_id, site_fxf_id, project_fxf_id,
                                form_status, submitted_by, date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id, instance_id, site_id, project_id, site_fxf_id, project_fxf_id,
                  form_status, submitted_by, date
        "#,
    )
    .bind(new.instance_id)
    .bind(new.site_id)
    .bind(new.project_id)
    .bind(new.site_fxf_id)
    .bind(new.project_fxf_id)
    .bind(new.form_status)
    .bind(new.submitted_by)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;
    Ok(finstance)
}

/// Record a review decision and move the wrapper to the new status
pub async fn record_status_change(
    pool: &SqlitePool,
    finstance_id: i64,
    new_status: i64,
    message: &str,
    user_id: Option<i64>,
) -> Result<InstanceStatusChange> {
    let mut tx = pool.begin().await?;

    let old_status: i64 = sqlx::query_scalar("SELECT form_status FROM finstances WHERE id = ?")
        .bind(finstance_id)
        .fetch_one(&mut *tx)
        .await?;

    let change = sqlx::query_as::<_, InstanceStatusChange>(
        r#"
        INSERT INTO instance_status_changes (finstance_id, message, old_status, new_status, user_id, date)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, finstance_id, message, old_status, new_status, user_id, date
        "#,
    )
    .bind(finstance_id)
    .bind(message)
    .bind(old_status)
    .bind(new_status)
    .bind(user_id)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE finstances SET form_status = ? WHERE id = ?")
        .bind(new_status)
        .bind(finstance_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::instances::create_instance;
    use crate::db::test_support::{insert_user, setup_pool};
    use crate::db::xforms::create_xform;

    async fn seed_instance(pool: &SqlitePool) -> (i64, i64) {
        let owner = insert_user(pool, "bob").await;
        let xform = create_xform(pool, "household", "", owner).await.unwrap();
        let instance = create_instance(pool, xform.id, "u1", "<d/>").await.unwrap();
        (owner, instance.id)
    }

    #[tokio::test]
    async fn test_status_history_for_instance() {
        let pool = setup_pool().await;
        let (reviewer, instance_id) = seed_instance(&pool).await;
        let finstance = create_finstance(
            &pool,
            &NewFInstance {
                instance_id,
                site_fxf_id: Some(7),
                ..NewFInstance::default()
            },
        )
        .await
        .unwrap();

        record_status_change(&pool, finstance.id, 2, "Missing photo", Some(reviewer))
            .await
            .unwrap();
        let approved = record_status_change(&pool, finstance.id, 3, "", None)
            .await
            .unwrap();

        let history = list_status_changes_for_instance(&pool, instance_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!((history[0].old_status, history[0].new_status), (0, 2));
        assert_eq!(history[0].user_name.as_deref(), Some("bob"));
        assert_eq!((history[1].old_status, history[1].new_status), (2, 3));
        assert_eq!(history[1].user_name, None);

        let single = get_status_change(&pool, approved.id).await.unwrap().unwrap();
        assert_eq!(single.instance_id, instance_id);
        assert!(get_status_change(&pool, approved.id + 10).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_responses_for_site_form() {
        let pool = setup_pool().await;
        let (owner, instance_id) = seed_instance(&pool).await;

        for site_fxf_id in [7, 7, 7, 8] {
            create_finstance(
                &pool,
                &NewFInstance {
                    instance_id,
                    site_fxf_id: Some(site_fxf_id),
                    submitted_by: Some(owner),
                    ..NewFInstance::default()
                },
            )
            .await
            .unwrap();
        }

        assert_eq!(count_finstances_for_site_fxf(&pool, 7).await.unwrap(), 3);
        assert_eq!(count_finstances_for_site_fxf(&pool, 9).await.unwrap(), 0);

        let page = list_finstances_for_site_fxf(&pool, 7, 2, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].submitted_by_name.as_deref(), Some("bob"));

        let rest = list_finstances_for_site_fxf(&pool, 7, 2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
    }
}
