use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewPost, Post, PostChanges};
use crate::db::StoreResult;

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create(&self, new: NewPost) -> StoreResult<Post>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Post>>;
    /// Newest first.
    async fn list_by_author(&self, author_id: Uuid, limit: i64, offset: i64)
        -> StoreResult<Vec<Post>>;
    async fn update(&self, id: Uuid, changes: &PostChanges) -> StoreResult<Option<Post>>;
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

pub struct PgPostStore {
    db: PgPool,
}

impl PgPostStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn create(&self, new: NewPost) -> StoreResult<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, author_id, title, content, topic, image_url, video_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, author_id, title, content, topic, image_url, video_url, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.author_id)
        .bind(&new.title)
        .bind(&new.content)
        .bind(&new.topic)
        .bind(&new.image_url)
        .bind(&new.video_url)
        .fetch_one(&self.db)
        .await?;
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, content, topic, image_url, video_url, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(post)
    }

    async fn list_by_author(
        &self,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, content, topic, image_url, video_url, created_at, updated_at
            FROM posts
            WHERE author_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        Ok(posts)
    }

    async fn update(&self, id: Uuid, changes: &PostChanges) -> StoreResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                topic = COALESCE($4, topic),
                updated_at = now()
            WHERE id = $1
            RETURNING id, author_id, title, content, topic, image_url, video_url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(&changes.topic)
        .fetch_optional(&self.db)
        .await?;
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let done = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}
