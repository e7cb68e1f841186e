use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Friendship, FriendshipRow, FriendshipStatus};
use crate::db::{StoreError, StoreResult};

#[async_trait]
pub trait FriendshipStore: Send + Sync {
    /// New pending request. `Duplicate("friendship")` if the pair already has a row.
    async fn create(&self, requester_id: Uuid, addressee_id: Uuid) -> StoreResult<Friendship>;
    /// Any row between the two users, in either direction.
    async fn find_between(&self, a: Uuid, b: Uuid) -> StoreResult<Option<Friendship>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Friendship>>;
    /// Moves `id` from `from` to `to`; `None` if the row was not in `from`.
    async fn transition(
        &self,
        id: Uuid,
        from: FriendshipStatus,
        to: FriendshipStatus,
    ) -> StoreResult<Option<Friendship>>;
    /// Accepted friendships involving `user_id` in either role.
    async fn friends_of(&self, user_id: Uuid) -> StoreResult<Vec<Friendship>>;
    /// Pending requests addressed to `user_id`.
    async fn pending_for(&self, user_id: Uuid) -> StoreResult<Vec<Friendship>>;
}

fn convert(row: FriendshipRow) -> StoreResult<Friendship> {
    Friendship::try_from(row).map_err(StoreError::Other)
}

fn convert_all(rows: Vec<FriendshipRow>) -> StoreResult<Vec<Friendship>> {
    rows.into_iter().map(convert).collect()
}

pub struct PgFriendshipStore {
    db: PgPool,
}

impl PgFriendshipStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FriendshipStore for PgFriendshipStore {
    async fn create(&self, requester_id: Uuid, addressee_id: Uuid) -> StoreResult<Friendship> {
        let row = sqlx::query_as::<_, FriendshipRow>(
            r#"
            INSERT INTO friendships (id, requester_id, addressee_id, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING id, requester_id, addressee_id, status, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(requester_id)
        .bind(addressee_id)
        .fetch_one(&self.db)
        .await?;
        convert(row)
    }

    async fn find_between(&self, a: Uuid, b: Uuid) -> StoreResult<Option<Friendship>> {
        let row = sqlx::query_as::<_, FriendshipRow>(
            r#"
            SELECT id, requester_id, addressee_id, status, created_at, updated_at
            FROM friendships
            WHERE (requester_id = $1 AND addressee_id = $2)
               OR (requester_id = $2 AND addressee_id = $1)
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.db)
        .await?;
        row.map(convert).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Friendship>> {
        let row = sqlx::query_as::<_, FriendshipRow>(
            r#"
            SELECT id, requester_id, addressee_id, status, created_at, updated_at
            FROM friendships
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(convert).transpose()
    }

    async fn transition(
        &self,
        id: Uuid,
        from: FriendshipStatus,
        to: FriendshipStatus,
    ) -> StoreResult<Option<Friendship>> {
        let row = sqlx::query_as::<_, FriendshipRow>(
            r#"
            UPDATE friendships
            SET status = $3, updated_at = now()
            WHERE id = $1 AND status = $2
            RETURNING id, requester_id, addressee_id, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.db)
        .await?;
        row.map(convert).transpose()
    }

    async fn friends_of(&self, user_id: Uuid) -> StoreResult<Vec<Friendship>> {
        let rows = sqlx::query_as::<_, FriendshipRow>(
            r#"
            SELECT id, requester_id, addressee_id, status, created_at, updated_at
            FROM friendships
            WHERE status = 'accepted' AND (requester_id = $1 OR addressee_id = $1)
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        convert_all(rows)
    }

    async fn pending_for(&self, user_id: Uuid) -> StoreResult<Vec<Friendship>> {
        let rows = sqlx::query_as::<_, FriendshipRow>(
            r#"
            SELECT id, requester_id, addressee_id, status, created_at, updated_at
            FROM friendships
            WHERE status = 'pending' AND addressee_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        convert_all(rows)
    }
}
