use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    repo::LikeStore,
    repo_types::{Like, LikeTarget},
};
use crate::db::{StoreError, StoreResult};

#[derive(Default)]
pub struct MemoryLikeStore {
    likes: RwLock<HashMap<(Uuid, LikeTarget), Like>>,
}

#[async_trait]
impl LikeStore for MemoryLikeStore {
    async fn create(&self, user_id: Uuid, target: LikeTarget) -> StoreResult<Like> {
        let mut likes = self.likes.write().await;
        if likes.contains_key(&(user_id, target)) {
            return Err(StoreError::Duplicate("like"));
        }
        let like = Like {
            id: Uuid::new_v4(),
            user_id,
            post_id: target.post_id(),
            comment_id: target.comment_id(),
            created_at: OffsetDateTime::now_utc(),
        };
        likes.insert((user_id, target), like.clone());
        Ok(like)
    }

    async fn delete(&self, user_id: Uuid, target: LikeTarget) -> StoreResult<bool> {
        Ok(self.likes.write().await.remove(&(user_id, target)).is_some())
    }

    async fn count(&self, target: LikeTarget) -> StoreResult<i64> {
        let likes = self.likes.read().await;
        Ok(likes.keys().filter(|(_, t)| *t == target).count() as i64)
    }
}
