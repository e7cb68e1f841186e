use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    repo::CommentStore,
    repo_types::{Comment, NewComment},
};
use crate::db::StoreResult;

#[derive(Default)]
pub struct MemoryCommentStore {
    comments: RwLock<HashMap<Uuid, Comment>>,
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn create(&self, new: NewComment) -> StoreResult<Comment> {
        let now = OffsetDateTime::now_utc();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: new.post_id,
            author_id: new.author_id,
            content: new.content,
            image_url: new.image_url,
            created_at: now,
            updated_at: now,
        };
        self.comments
            .write()
            .await
            .insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        Ok(self.comments.read().await.get(&id).cloned())
    }

    async fn list_for_post(&self, post_id: Uuid) -> StoreResult<Vec<Comment>> {
        let comments = self.comments.read().await;
        let mut found: Vec<Comment> = comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        found.sort_by_key(|c| c.created_at);
        Ok(found)
    }

    async fn update_content(&self, id: Uuid, content: &str) -> StoreResult<Option<Comment>> {
        let mut comments = self.comments.write().await;
        Ok(comments.get_mut(&id).map(|c| {
            c.content = content.to_string();
            c.updated_at = OffsetDateTime::now_utc();
            c.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.comments.write().await.remove(&id).is_some())
    }
}
