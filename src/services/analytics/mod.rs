use crate::config::RedisConfig;
use crate::error::StoreResult;
use crate::models::InteractionEvent;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// Destination for "recommendation shown" events.
#[async_trait::async_trait]
pub trait InteractionLog: Send + Sync {
    async fn log_interaction(&self, event: &InteractionEvent) -> StoreResult<()>;
}

/// Writes events to the tracing subscriber only.
#[derive(Debug, Default)]
pub struct TracingInteractionLog;

#[async_trait::async_trait]
impl InteractionLog for TracingInteractionLog {
    async fn log_interaction(&self, event: &InteractionEvent) -> StoreResult<()> {
        info!(
            user_id = %event.user_id,
            recommendation_id = %event.recommendation_id,
            confidence = event.confidence,
            model_version = %event.model_version,
            items = ?event.recommended_items,
            "Interaction logged"
        );
        Ok(())
    }
}

/// Keeps a capped per-user list of events in Redis.
///
/// One multiplexed connection is opened on the first event and shared by every later call.
pub struct RedisInteractionLog {
    client: Arc<redis::Client>,
    connection: OnceCell<MultiplexedConnection>,
    key_prefix: String,
    max_entries: usize,
}

impl RedisInteractionLog {
    pub fn new(config: &RedisConfig) -> StoreResult<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        Ok(Self {
            client: Arc::new(client),
            connection: OnceCell::new(),
            key_prefix: config.key_prefix.clone(),
            max_entries: config.max_entries.max(1),
        })
    }

    pub fn key_for(&self, user_id: &str) -> String {
        format!("{}:interactions:{}", self.key_prefix, user_id)
    }

    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }

    async fn connection(&self) -> StoreResult<MultiplexedConnection> {
        let conn = self
            .connection
            .get_or_try_init(|| self.client.get_multiplexed_async_connection())
            .await?;
        Ok(conn.clone())
    }
}

#[async_trait::async_trait]
impl InteractionLog for RedisInteractionLog {
    async fn log_interaction(&self, event: &InteractionEvent) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        let key = self.key_for(&event.user_id);
        let payload = serde_json::to_string(event)?;

        let _: () = conn.lpush(&key, payload).await?;
        let _: () = conn.ltrim(&key, 0, self.max_entries as isize - 1).await?;

        info!(
            user_id = %event.user_id,
            recommendation_id = %event.recommendation_id,
            "Interaction logged to Redis"
        );
        Ok(())
    }
}

/// Picks the configured backend.
pub fn interaction_log_from_config(config: &RedisConfig) -> StoreResult<Arc<dyn InteractionLog>> {
    if config.enabled {
        Ok(Arc::new(RedisInteractionLog::new(config)?))
    } else {
        Ok(Arc::new(TracingInteractionLog))
    }
}
