//! Durable email queue.
//!
//! Messages are JSON-encoded [`EmailJob`]s pushed onto a Redis list; the
//! worker pops them from the other end one at a time.

use anyhow::Context;
use async_trait::async_trait;
use redis::{
    aio::{ConnectionManager, MultiplexedConnection},
    AsyncCommands, Client,
};
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use super::job::EmailJob;

/// Seconds a single BLPOP waits before the consumer polls again.
const POP_TIMEOUT_SECS: f64 = 5.0;

#[async_trait]
pub trait EmailQueue: Send + Sync {
    async fn publish(&self, payload: Vec<u8>) -> anyhow::Result<()>;

    /// Waits for the next raw message. `Ok(None)` means the queue is closed
    /// and no more messages will arrive.
    async fn consume(&self) -> anyhow::Result<Option<Vec<u8>>>;
}

pub async fn publish_job(queue: &dyn EmailQueue, job: &EmailJob) -> anyhow::Result<()> {
    let payload = serde_json::to_vec(job).context("serialize email job")?;
    queue.publish(payload).await
}

pub struct RedisEmailQueue {
    client: Client,
    publisher: ConnectionManager,
    consumer: Mutex<Option<MultiplexedConnection>>,
    name: String,
}

impl RedisEmailQueue {
    pub async fn connect(redis_url: &str, name: &str) -> anyhow::Result<Self> {
        let client = Client::open(redis_url).context("open redis client")?;
        let publisher = ConnectionManager::new(client.clone())
            .await
            .context("connect to redis")?;
        Ok(Self {
            client,
            publisher,
            consumer: Mutex::new(None),
            name: name.to_string(),
        })
    }
}

#[async_trait]
impl EmailQueue for RedisEmailQueue {
    async fn publish(&self, payload: Vec<u8>) -> anyhow::Result<()> {
        let mut conn = self.publisher.clone();
        let _: () = conn
            .rpush(&self.name, payload)
            .await
            .with_context(|| format!("push to queue {}", self.name))?;
        debug!(queue = %self.name, "email job published");
        Ok(())
    }

    async fn consume(&self) -> anyhow::Result<Option<Vec<u8>>> {
        // blocking pops get a connection of their own so publishes never queue behind them
        let mut guard = self.consumer.lock().await;
        if guard.is_none() {
            let conn = self
                .client
                .get_multiplexed_async_connection()
                .await
                .context("open redis consumer connection")?;
            *guard = Some(conn);
        }
        let Some(conn) = guard.as_mut() else {
            anyhow::bail!("redis consumer connection unavailable");
        };

        loop {
            let popped: redis::RedisResult<Option<(String, Vec<u8>)>> =
                conn.blpop(&self.name, POP_TIMEOUT_SECS).await;
            match popped {
                Ok(Some((_, payload))) => return Ok(Some(payload)),
                Ok(None) => continue,
                Err(e) => {
                    *guard = None;
                    return Err(e).with_context(|| format!("pop from queue {}", self.name));
                }
            }
        }
    }
}

/// In-process queue used by tests and `AppState::fake()`.
pub struct MemoryEmailQueue {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    rx: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl Default for MemoryEmailQueue {
    fn default() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }
}

impl MemoryEmailQueue {
    /// Pops a message if one is waiting, without blocking.
    pub async fn try_next(&self) -> Option<Vec<u8>> {
        self.rx.lock().await.try_recv().ok()
    }

    /// Closes the receiving side; once drained, `consume` yields `None`.
    pub async fn close(&self) {
        self.rx.lock().await.close();
    }
}

#[async_trait]
impl EmailQueue for MemoryEmailQueue {
    async fn publish(&self, payload: Vec<u8>) -> anyhow::Result<()> {
        self.tx
            .send(payload)
            .map_err(|_| anyhow::anyhow!("email queue closed"))
    }

    async fn consume(&self) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.rx.lock().await.recv().await)
    }
}
