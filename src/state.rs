use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    auth::{JwtKeys, MemoryTokenBlacklist, PgTokenBlacklist, TokenBlacklist},
    comments::{CommentStore, MemoryCommentStore, PgCommentStore},
    config::AppConfig,
    email::{EmailQueue, MemoryEmailQueue, RedisEmailQueue},
    friendships::{FriendshipStore, MemoryFriendshipStore, PgFriendshipStore},
    likes::{LikeStore, MemoryLikeStore, PgLikeStore},
    posts::{MemoryPostStore, PgPostStore, PostStore},
    storage::{LocalStorage, MemoryStorage, StorageClient},
    users::{MemoryUserStore, PgUserStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub users: Arc<dyn UserStore>,
    pub blacklist: Arc<dyn TokenBlacklist>,
    pub posts: Arc<dyn PostStore>,
    pub comments: Arc<dyn CommentStore>,
    pub likes: Arc<dyn LikeStore>,
    pub friendships: Arc<dyn FriendshipStore>,
    pub email_queue: Arc<dyn EmailQueue>,
    pub storage: Arc<dyn StorageClient>,
}

impl AppState {
    /// Postgres-backed stores, the Redis queue and on-disk media.
    pub async fn init(config: AppConfig, db: PgPool) -> anyhow::Result<Self> {
        let email_queue =
            RedisEmailQueue::connect(&config.redis_url, &config.email_queue).await?;
        let storage = LocalStorage::new(config.upload_dir.clone());

        Ok(Self {
            jwt: JwtKeys::from(&config.jwt),
            users: Arc::new(PgUserStore::new(db.clone())),
            blacklist: Arc::new(PgTokenBlacklist::new(db.clone())),
            posts: Arc::new(PgPostStore::new(db.clone())),
            comments: Arc::new(PgCommentStore::new(db.clone())),
            likes: Arc::new(PgLikeStore::new(db.clone())),
            friendships: Arc::new(PgFriendshipStore::new(db)),
            email_queue: Arc::new(email_queue),
            storage: Arc::new(storage),
            config: Arc::new(config),
        })
    }

    /// Fully in-memory state; nothing touches the network or the disk.
    pub fn fake() -> Self {
        Self::fake_with_queue().0
    }

    /// Like [`AppState::fake`], also handing back the queue so tests can
    /// inspect what was published.
    pub fn fake_with_queue() -> (Self, Arc<MemoryEmailQueue>) {
        let config = AppConfig::test_default();
        let queue = Arc::new(MemoryEmailQueue::default());
        let state = Self {
            jwt: JwtKeys::from(&config.jwt),
            users: Arc::new(MemoryUserStore::default()),
            blacklist: Arc::new(MemoryTokenBlacklist::default()),
            posts: Arc::new(MemoryPostStore::default()),
            comments: Arc::new(MemoryCommentStore::default()),
            likes: Arc::new(MemoryLikeStore::default()),
            friendships: Arc::new(MemoryFriendshipStore::default()),
            email_queue: queue.clone(),
            storage: Arc::new(MemoryStorage::default()),
            config: Arc::new(config),
        };
        (state, queue)
    }

    pub fn with_storage(mut self, storage: Arc<dyn StorageClient>) -> Self {
        self.storage = storage;
        self
    }
}
