use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::error::AppResult;

/// Keys for cached TMDB responses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    MovieDetails(u64),
    MovieSearch { query: String, page: u32 },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::MovieDetails(id) => write!(f, "tmdb:movie:{}", id),
            CacheKey::MovieSearch { query, page } => {
                write!(f, "tmdb:search:{}:{}", page, query.trim().to_lowercase())
            }
        }
    }
}

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Pending write handed to the writer task
struct PendingWrite {
    key: String,
    json: String,
    ttl_secs: u64,
}

/// Read-through cache for metadata lookups
///
/// Reads hit Redis directly. Writes are queued on a channel and applied by a
/// background task so a cache miss never waits on the store.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    writes: mpsc::UnboundedSender<PendingWrite>,
}

/// Stops the writer task after it drains queued writes
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Signals the writer and waits for it to flush
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task panicked");
        }
        tracing::info!("Cache writer stopped");
    }
}

impl Cache {
    /// Creates the cache and spawns its writer task
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (writes, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        let task = tokio::spawn(Self::run_writer(client, write_rx, shutdown_rx));

        (
            Self {
                redis_client,
                writes,
            },
            CacheWriterHandle { shutdown_tx, task },
        )
    }

    async fn run_writer(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<PendingWrite>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::debug!("Cache writer started");

        loop {
            tokio::select! {
                Some(write) = write_rx.recv() => {
                    Self::apply(&client, write).await;
                }
                _ = shutdown_rx.recv() => {
                    write_rx.close();
                    let mut flushed = 0usize;
                    while let Some(write) = write_rx.recv().await {
                        Self::apply(&client, write).await;
                        flushed += 1;
                    }
                    tracing::info!(flushed, "Cache writer drained queue");
                    break;
                }
            }
        }
    }

    async fn apply(client: &Client, write: PendingWrite) {
        let PendingWrite {
            key,
            json,
            ttl_secs,
        } = write;

        let result: AppResult<()> = async {
            let mut conn = client.get_multiplexed_async_connection().await?;
            let _: () = conn.set_ex(&key, json, ttl_secs).await?;
            Ok(())
        }
        .await;

        if let Err(e) = result {
            tracing::error!(key = %key, error = %e, "Failed to write to Redis cache");
        }
    }

    /// Returns the cached value for a key, if present
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        cached
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error for {}: {}", key, e))
                })
            })
            .transpose()
    }

    /// Queues a value for writing and returns immediately
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl_secs: u64) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Cache serialization error");
                return;
            }
        };

        let write = PendingWrite {
            key: key.to_string(),
            json,
            ttl_secs,
        };

        if self.writes.send(write).is_err() {
            tracing::warn!(key = %key, "Cache writer gone, dropping write");
        }
    }
}
