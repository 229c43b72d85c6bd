use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::{
    models::{client::ClientProfile, matchmaking::QueuedClient},
    repositories::queue_repository::WaitingPool,
    services::errors::queue_service_errors::QueueServiceError,
    time_source::TimeSource,
};

/// Entry and exit for the matchmaking pool. The pool has its own lock,
/// independent of the match registry.
#[derive(Clone)]
pub struct QueueService {
    pool: Arc<Mutex<WaitingPool>>,
    time_source: Arc<dyn TimeSource + Send + Sync>,
}

impl QueueService {
    pub fn new(time_source: Arc<dyn TimeSource + Send + Sync>) -> Self {
        QueueService {
            pool: Arc::new(Mutex::new(WaitingPool::new())),
            time_source,
        }
    }

    pub async fn add_client(&self, profile: ClientProfile) -> Result<(), QueueServiceError> {
        let joined_at = self.time_source.now();
        let client_key = profile.client_key.clone();
        let elo = profile.elo;

        self.pool.lock().await.add_client(profile, joined_at)?;

        info!("Client {} joined the matchmaking queue (elo {})", client_key, elo);
        Ok(())
    }

    pub async fn remove_client(&self, client_key: &str) -> Result<QueuedClient, QueueServiceError> {
        let node = self.pool.lock().await.remove_client(client_key)?;

        info!("Client {} left the matchmaking queue", client_key);
        Ok(node.to_queued_client())
    }

    /// Puts a client back where its original join time places it, ahead of
    /// anyone who joined later.
    pub async fn requeue(&self, queued: QueuedClient) -> Result<(), QueueServiceError> {
        let client_key = queued.profile.client_key.clone();

        self.pool
            .lock()
            .await
            .insert_by_join_time(queued.profile, queued.joined_at)?;

        info!("Client {} returned to the matchmaking queue", client_key);
        Ok(())
    }

    /// Waiting clients in join order.
    pub async fn snapshot(&self) -> Vec<QueuedClient> {
        self.pool
            .lock()
            .await
            .iter()
            .map(|node| node.to_queued_client())
            .collect()
    }

    pub async fn contains(&self, client_key: &str) -> bool {
        self.pool.lock().await.contains(client_key)
    }

    pub async fn len(&self) -> usize {
        self.pool.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pool.lock().await.is_empty()
    }
}
