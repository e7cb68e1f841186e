//! Revoked session tokens.
//!
//! Logout records the token here with the token's own expiry. The auth gate
//! rejects any token present in the set. Rows past their expiry can never
//! matter again (the codec rejects the token first) and are purged
//! periodically.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::{error, info};

use crate::db::StoreResult;

#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Re-adding a token already present is a no-op.
    async fn add(&self, token: &str, expires_at: OffsetDateTime) -> StoreResult<()>;
    async fn is_blacklisted(&self, token: &str) -> StoreResult<bool>;
    /// Removes entries whose expiry has passed; returns how many went.
    async fn purge_expired(&self) -> StoreResult<u64>;
}

pub struct PgTokenBlacklist {
    db: PgPool,
}

impl PgTokenBlacklist {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenBlacklist for PgTokenBlacklist {
    async fn add(&self, token: &str, expires_at: OffsetDateTime) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO token_blacklist (token, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (token) DO NOTHING
            "#,
        )
        .bind(token)
        .bind(expires_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn is_blacklisted(&self, token: &str) -> StoreResult<bool> {
        let (exists,): (bool,) =
            sqlx::query_as(r#"SELECT EXISTS (SELECT 1 FROM token_blacklist WHERE token = $1)"#)
                .bind(token)
                .fetch_one(&self.db)
                .await?;
        Ok(exists)
    }

    async fn purge_expired(&self) -> StoreResult<u64> {
        let done = sqlx::query(r#"DELETE FROM token_blacklist WHERE expires_at < now()"#)
            .execute(&self.db)
            .await?;
        Ok(done.rows_affected())
    }
}

#[derive(Default)]
pub struct MemoryTokenBlacklist {
    entries: RwLock<HashMap<String, OffsetDateTime>>,
}

#[async_trait]
impl TokenBlacklist for MemoryTokenBlacklist {
    async fn add(&self, token: &str, expires_at: OffsetDateTime) -> StoreResult<()> {
        self.entries
            .write()
            .await
            .entry(token.to_string())
            .or_insert(expires_at);
        Ok(())
    }

    async fn is_blacklisted(&self, token: &str) -> StoreResult<bool> {
        Ok(self.entries.read().await.contains_key(token))
    }

    async fn purge_expired(&self) -> StoreResult<u64> {
        let now = OffsetDateTime::now_utc();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at >= now);
        Ok((before - entries.len()) as u64)
    }
}

/// Runs `purge_expired` every `every` for the life of the process.
pub fn spawn_purge_task(blacklist: Arc<dyn TokenBlacklist>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match blacklist.purge_expired().await {
                Ok(removed) => info!(removed, "expired tokens removed from blacklist"),
                Err(e) => error!(error = %e, "failed to purge token blacklist"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration as TimeDuration;

    #[tokio::test]
    async fn added_token_is_blacklisted_and_others_are_not() {
        let bl = MemoryTokenBlacklist::default();
        let exp = OffsetDateTime::now_utc() + TimeDuration::hours(1);
        bl.add("tok-a", exp).await.expect("add");
        assert!(bl.is_blacklisted("tok-a").await.expect("check"));
        assert!(!bl.is_blacklisted("tok-b").await.expect("check"));
        assert!(!bl.is_blacklisted("tok-a ").await.expect("exact match only"));
    }

    #[tokio::test]
    async fn duplicate_add_is_ignored() {
        let bl = MemoryTokenBlacklist::default();
        let exp = OffsetDateTime::now_utc() + TimeDuration::hours(1);
        bl.add("tok", exp).await.expect("add");
        bl.add("tok", exp).await.expect("second add");
        assert!(bl.is_blacklisted("tok").await.expect("check"));
    }

    #[tokio::test]
    async fn purge_drops_only_expired_entries() {
        let bl = MemoryTokenBlacklist::default();
        let now = OffsetDateTime::now_utc();
        bl.add("old", now - TimeDuration::minutes(5)).await.expect("add");
        bl.add("live", now + TimeDuration::hours(1)).await.expect("add");

        assert_eq!(bl.purge_expired().await.expect("purge"), 1);
        assert!(!bl.is_blacklisted("old").await.expect("check"));
        assert!(bl.is_blacklisted("live").await.expect("check"));
    }

    #[tokio::test(start_paused = true)]
    async fn purge_task_runs_on_schedule() {
        let bl = Arc::new(MemoryTokenBlacklist::default());
        bl.add("old", OffsetDateTime::now_utc() - TimeDuration::minutes(5))
            .await
            .expect("add");

        let handle = spawn_purge_task(bl.clone(), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        assert!(!bl.is_blacklisted("old").await.expect("check"));
        handle.abort();
    }
}
