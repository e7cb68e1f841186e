use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    repo::FriendshipStore,
    repo_types::{Friendship, FriendshipStatus},
};
use crate::db::{StoreError, StoreResult};

#[derive(Default)]
pub struct MemoryFriendshipStore {
    rows: RwLock<HashMap<Uuid, Friendship>>,
}

fn is_pair(f: &Friendship, a: Uuid, b: Uuid) -> bool {
    (f.requester_id == a && f.addressee_id == b) || (f.requester_id == b && f.addressee_id == a)
}

#[async_trait]
impl FriendshipStore for MemoryFriendshipStore {
    async fn create(&self, requester_id: Uuid, addressee_id: Uuid) -> StoreResult<Friendship> {
        let mut rows = self.rows.write().await;
        if rows.values().any(|f| is_pair(f, requester_id, addressee_id)) {
            return Err(StoreError::Duplicate("friendship"));
        }
        let now = OffsetDateTime::now_utc();
        let friendship = Friendship {
            id: Uuid::new_v4(),
            requester_id,
            addressee_id,
            status: FriendshipStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        rows.insert(friendship.id, friendship.clone());
        Ok(friendship)
    }

    async fn find_between(&self, a: Uuid, b: Uuid) -> StoreResult<Option<Friendship>> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|f| is_pair(f, a, b)).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Friendship>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn transition(
        &self,
        id: Uuid,
        from: FriendshipStatus,
        to: FriendshipStatus,
    ) -> StoreResult<Option<Friendship>> {
        let mut rows = self.rows.write().await;
        Ok(rows
            .get_mut(&id)
            .filter(|f| f.status == from)
            .map(|f| {
                f.status = to;
                f.updated_at = OffsetDateTime::now_utc();
                f.clone()
            }))
    }

    async fn friends_of(&self, user_id: Uuid) -> StoreResult<Vec<Friendship>> {
        let rows = self.rows.read().await;
        let mut found: Vec<Friendship> = rows
            .values()
            .filter(|f| {
                f.status == FriendshipStatus::Accepted
                    && (f.requester_id == user_id || f.addressee_id == user_id)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(found)
    }

    async fn pending_for(&self, user_id: Uuid) -> StoreResult<Vec<Friendship>> {
        let rows = self.rows.read().await;
        let mut found: Vec<Friendship> = rows
            .values()
            .filter(|f| f.status == FriendshipStatus::Pending && f.addressee_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|f| f.created_at);
        Ok(found)
    }
}
