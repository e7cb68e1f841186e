use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Like, LikeTarget};
use crate::db::StoreResult;

#[async_trait]
pub trait LikeStore: Send + Sync {
    /// `StoreError::Duplicate("like")` when the user already likes the target.
    async fn create(&self, user_id: Uuid, target: LikeTarget) -> StoreResult<Like>;
    async fn delete(&self, user_id: Uuid, target: LikeTarget) -> StoreResult<bool>;
    async fn count(&self, target: LikeTarget) -> StoreResult<i64>;
}

pub struct PgLikeStore {
    db: PgPool,
}

impl PgLikeStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LikeStore for PgLikeStore {
    async fn create(&self, user_id: Uuid, target: LikeTarget) -> StoreResult<Like> {
        let like = sqlx::query_as::<_, Like>(
            r#"
            INSERT INTO likes (id, user_id, post_id, comment_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, post_id, comment_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(target.post_id())
        .bind(target.comment_id())
        .fetch_one(&self.db)
        .await?;
        Ok(like)
    }

    async fn delete(&self, user_id: Uuid, target: LikeTarget) -> StoreResult<bool> {
        let done = sqlx::query(
            r#"
            DELETE FROM likes
            WHERE user_id = $1
              AND post_id IS NOT DISTINCT FROM $2
              AND comment_id IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(user_id)
        .bind(target.post_id())
        .bind(target.comment_id())
        .execute(&self.db)
        .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn count(&self, target: LikeTarget) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM likes
            WHERE post_id IS NOT DISTINCT FROM $1
              AND comment_id IS NOT DISTINCT FROM $2
            "#,
        )
        .bind(target.post_id())
        .bind(target.comment_id())
        .fetch_one(&self.db)
        .await?;
        Ok(count)
    }
}
