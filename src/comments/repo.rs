use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Comment, NewComment};
use crate::db::StoreResult;

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn create(&self, new: NewComment) -> StoreResult<Comment>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Comment>>;
    /// Oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> StoreResult<Vec<Comment>>;
    async fn update_content(&self, id: Uuid, content: &str) -> StoreResult<Option<Comment>>;
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

pub struct PgCommentStore {
    db: PgPool,
}

impl PgCommentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn create(&self, new: NewComment) -> StoreResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, post_id, author_id, content, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, post_id, author_id, content, image_url, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.post_id)
        .bind(new.author_id)
        .bind(&new.content)
        .bind(&new.image_url)
        .fetch_one(&self.db)
        .await?;
        Ok(comment)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, content, image_url, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: Uuid) -> StoreResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, content, image_url, created_at, updated_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.db)
        .await?;
        Ok(comments)
    }

    async fn update_content(&self, id: Uuid, content: &str) -> StoreResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, post_id, author_id, content, image_url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.db)
        .await?;
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let done = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}
