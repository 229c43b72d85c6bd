use std::time::Duration;

use shared::{
    config::ArbiterConfig,
    models::{game_match::Match, matchmaking::QueuedClient, time_control::TimeControl},
    services::{match_service::MatchService, queue_service::QueueService},
};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::services::{errors::MatchmakingServiceError, MatchmakingService, Pairing};

#[derive(Clone)]
pub struct MatchmakingProcessor {
    queue_service: QueueService,
    match_service: MatchService,
    matchmaking_service: MatchmakingService,
    tick: Duration,
    time_control: TimeControl,
}

impl MatchmakingProcessor {
    pub fn new(queue_service: QueueService, match_service: MatchService, config: &ArbiterConfig) -> Self {
        Self {
            queue_service,
            match_service,
            matchmaking_service: MatchmakingService::new(config.pairing_weight_threshold),
            tick: config.matchmaking_tick,
            time_control: config.matchmaking_time_control,
        }
    }

    /// Runs a matchmaking pass every tick. A pass is awaited before the next
    /// tick is taken, so passes never overlap.
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            self.process_tick().await;
        }
    }

    /// One pass over the pool. Returns how many matches were created.
    pub async fn process_tick(&self) -> usize {
        let queued = self.available_clients().await;
        if queued.len() < 2 {
            debug!(
                "{} available client(s) queued, skipping matchmaking pass",
                queued.len()
            );
            return 0;
        }

        let now = self.match_service.now();
        let pairings = self.matchmaking_service.find_pairs(&queued, now);
        let mut created = 0;

        for pairing in &pairings {
            match self.process_pair(pairing).await {
                Ok(()) => created += 1,
                Err(MatchmakingServiceError::Unavailable(client_key)) => {
                    warn!(
                        "Skipping pair {} / {}: {} is busy",
                        pairing.first.client_key(),
                        pairing.second.client_key(),
                        client_key
                    );
                }
                Err(e) => {
                    error!(
                        "Failed to match {} with {}: {}",
                        pairing.first.client_key(),
                        pairing.second.client_key(),
                        e
                    );
                }
            }
        }

        if created > 0 {
            info!(
                "Matchmaking pass created {} match(es), {} client(s) still queued",
                created,
                self.queue_service.len().await
            );
        }

        created
    }

    /// Queued clients who could enter a match right now, in join order. Busy
    /// players stay in the pool but are not offered as opponents.
    async fn available_clients(&self) -> Vec<QueuedClient> {
        let mut available = Vec::new();
        for queued in self.queue_service.snapshot().await {
            if self.match_service.can_start_match(queued.client_key()).await {
                available.push(queued);
            } else {
                debug!("{} is in a match, leaving them queued", queued.client_key());
            }
        }
        available
    }

    async fn process_pair(&self, pairing: &Pairing) -> Result<(), MatchmakingServiceError> {
        for client in [&pairing.first, &pairing.second] {
            if !self.match_service.can_start_match(client.client_key()).await {
                return Err(MatchmakingServiceError::Unavailable(
                    client.client_key().to_string(),
                ));
            }
        }

        let first = self
            .queue_service
            .remove_client(pairing.first.client_key())
            .await?;
        let second = match self
            .queue_service
            .remove_client(pairing.second.client_key())
            .await
        {
            Ok(second) => second,
            Err(e) => {
                self.requeue(first).await;
                return Err(e.into());
            }
        };

        let new_match = Match::with_random_colours(
            first.client_key(),
            second.client_key(),
            self.time_control,
            self.match_service.now(),
        );

        if let Err(e) = self.match_service.add_match(new_match).await {
            self.requeue(first).await;
            self.requeue(second).await;
            return Err(e.into());
        }

        info!(
            "Paired {} ({}) with {} ({}), weight {:.2}",
            first.client_key(),
            first.profile.elo,
            second.client_key(),
            second.profile.elo,
            pairing.weight
        );

        Ok(())
    }

    async fn requeue(&self, client: QueuedClient) {
        let client_key = client.client_key().to_string();
        if let Err(e) = self.queue_service.requeue(client).await {
            warn!("Could not return {} to the queue: {}", client_key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use shared::{
        models::{
            client::{ClientProfile, ClientRole},
            notification::Notification,
        },
        repositories::{
            notification_repository::ChannelNotificationSink,
            role_repository::InMemoryRoleRepository,
        },
        services::{chess_service::ChessService, notification_service::NotificationService},
        time_source::{ManualTimeSource, TimeSource},
    };
    use std::sync::Arc;
    use tokio::sync::mpsc::UnboundedReceiver;

    struct Harness {
        processor: MatchmakingProcessor,
        queue_service: QueueService,
        match_service: MatchService,
        roles: Arc<InMemoryRoleRepository>,
        clock: Arc<ManualTimeSource>,
        _notifications: UnboundedReceiver<Notification>,
    }

    fn harness() -> Harness {
        let config = ArbiterConfig::default();
        let clock = Arc::new(ManualTimeSource::new(Utc::now()));
        let roles = Arc::new(InMemoryRoleRepository::new());
        let (sink, notifications) = ChannelNotificationSink::new();

        let match_service = MatchService::new(
            Arc::new(ChessService::new()),
            roles.clone(),
            NotificationService::new(Arc::new(sink)),
            clock.clone(),
            &config,
        );
        let queue_service = QueueService::new(clock.clone());
        let processor =
            MatchmakingProcessor::new(queue_service.clone(), match_service.clone(), &config);

        Harness {
            processor,
            queue_service,
            match_service,
            roles,
            clock,
            _notifications: notifications,
        }
    }

    impl Harness {
        async fn enqueue(&self, client_key: &str, elo: i32) {
            self.queue_service
                .add_client(ClientProfile::new(client_key, elo))
                .await
                .unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pairs_close_ratings() {
        let h = harness();
        h.enqueue("alice", 1500).await;
        h.enqueue("bob", 1520).await;

        let created = h.processor.process_tick().await;

        assert_eq!(created, 1);
        assert!(h.queue_service.is_empty().await);
        let created_match = h.match_service.match_by_client_key("alice").await.unwrap();
        assert_eq!(
            h.match_service.match_by_client_key("bob").await,
            Some(created_match.clone())
        );
        assert_eq!(created_match.time_control, TimeControl::BLITZ);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skips_single_client() {
        let h = harness();
        h.enqueue("alice", 1500).await;

        assert_eq!(h.processor.process_tick().await, 0);
        assert!(h.queue_service.contains("alice").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiting_widens_the_search() {
        let h = harness();
        h.enqueue("alice", 1200).await;
        h.enqueue("bob", 1400).await;

        assert_eq!(h.processor.process_tick().await, 0);
        assert_eq!(h.queue_service.len().await, 2);

        h.clock.advance(ChronoDuration::seconds(150));

        assert_eq!(h.processor.process_tick().await, 1);
        assert!(h.queue_service.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_player_stays_queued() {
        let h = harness();
        h.match_service
            .add_match(Match::new("alice", "carol", TimeControl::RAPID, h.clock.now()))
            .await
            .unwrap();
        h.enqueue("alice", 1500).await;
        h.enqueue("bob", 1500).await;

        assert_eq!(h.processor.process_tick().await, 0);
        assert!(h.queue_service.contains("alice").await);
        assert!(h.queue_service.contains("bob").await);
        assert_eq!(h.match_service.active_match_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_player_does_not_block_next_best_opponent() {
        let h = harness();
        h.match_service
            .add_match(Match::new("busy", "carol", TimeControl::RAPID, h.clock.now()))
            .await
            .unwrap();
        h.enqueue("alice", 1200).await;
        h.enqueue("busy", 1200).await;
        h.enqueue("bob", 1220).await;

        assert_eq!(h.processor.process_tick().await, 1);

        let alice_match = h.match_service.match_by_client_key("alice").await.unwrap();
        assert!(alice_match.colour_of("bob").is_some());
        assert!(!h.queue_service.contains("alice").await);
        assert!(!h.queue_service.contains("bob").await);
        assert!(h.queue_service.contains("busy").await);
        assert_eq!(h.match_service.active_match_count().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_bot_is_still_paired() {
        let h = harness();
        h.roles.set_role("engine", ClientRole::Bot).await;
        h.match_service
            .add_match(Match::new("engine", "carol", TimeControl::RAPID, h.clock.now()))
            .await
            .unwrap();
        h.enqueue("engine", 1500).await;
        h.enqueue("bob", 1500).await;

        assert_eq!(h.processor.process_tick().await, 1);
        assert_eq!(h.match_service.active_match_count().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pairs_keep_join_order() {
        let h = harness();
        for (key, elo) in [("a", 1000), ("b", 1800), ("c", 1010), ("d", 1790), ("e", 3000)] {
            h.enqueue(key, elo).await;
        }

        assert_eq!(h.processor.process_tick().await, 2);

        let a_match = h.match_service.match_by_client_key("a").await.unwrap();
        assert!(a_match.colour_of("c").is_some());
        let b_match = h.match_service.match_by_client_key("b").await.unwrap();
        assert!(b_match.colour_of("d").is_some());
        let remaining: Vec<String> = h
            .queue_service
            .snapshot()
            .await
            .into_iter()
            .map(|queued| queued.profile.client_key)
            .collect();
        assert_eq!(remaining, vec!["e".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_matches_on_tick() {
        let h = harness();
        h.enqueue("alice", 1500).await;
        h.enqueue("bob", 1500).await;

        let processor = h.processor.clone();
        let task = tokio::spawn(async move { processor.run().await });

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(h.match_service.active_match_count().await, 1);
        assert!(h.queue_service.is_empty().await);
        task.abort();
    }
}
