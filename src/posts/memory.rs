use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    repo::PostStore,
    repo_types::{NewPost, Post, PostChanges},
};
use crate::db::StoreResult;

#[derive(Default)]
pub struct MemoryPostStore {
    posts: RwLock<HashMap<Uuid, Post>>,
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn create(&self, new: NewPost) -> StoreResult<Post> {
        let now = OffsetDateTime::now_utc();
        let post = Post {
            id: Uuid::new_v4(),
            author_id: new.author_id,
            title: new.title,
            content: new.content,
            topic: new.topic,
            image_url: new.image_url,
            video_url: new.video_url,
            created_at: now,
            updated_at: now,
        };
        self.posts.write().await.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Post>> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn list_by_author(
        &self,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Post>> {
        let posts = self.posts.read().await;
        let mut mine: Vec<Post> = posts
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn update(&self, id: Uuid, changes: &PostChanges) -> StoreResult<Option<Post>> {
        let mut posts = self.posts.write().await;
        Ok(posts.get_mut(&id).map(|post| {
            if let Some(title) = &changes.title {
                post.title = title.clone();
            }
            if let Some(content) = &changes.content {
                post.content = content.clone();
            }
            if let Some(topic) = &changes.topic {
                post.topic = topic.clone();
            }
            post.updated_at = OffsetDateTime::now_utc();
            post.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.posts.write().await.remove(&id).is_some())
    }
}
