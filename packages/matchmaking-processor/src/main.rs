use std::sync::Arc;

use shared::{
    config::ArbiterConfig,
    repositories::{
        notification_repository::ChannelNotificationSink, role_repository::InMemoryRoleRepository,
    },
    services::{
        chess_service::ChessService, match_service::MatchService,
        notification_service::NotificationService, queue_service::QueueService,
    },
    time_source::{SystemTimeSource, TimeSource},
};
use tracing::{error, info};

mod processor;
mod services;

use processor::MatchmakingProcessor;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = ArbiterConfig::from_env();

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_target(false)
        .init();

    let (sink, mut notifications) = ChannelNotificationSink::new();
    let time_source: Arc<dyn TimeSource + Send + Sync> = Arc::new(SystemTimeSource);

    let match_service = MatchService::new(
        Arc::new(ChessService::new()),
        Arc::new(InMemoryRoleRepository::new()),
        NotificationService::new(Arc::new(sink)),
        time_source.clone(),
        &config,
    );
    let queue_service = QueueService::new(time_source);
    let processor = MatchmakingProcessor::new(queue_service, match_service, &config);

    // Hands notifications to the messaging layer; here they are only logged.
    tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            match notification.to_json() {
                Ok(payload) => info!(
                    "Notify {:?} ({}): {}",
                    notification.recipients(),
                    notification.kind(),
                    payload
                ),
                Err(e) => error!("Failed to encode {} notification: {}", notification.kind(), e),
            }
        }
    });

    info!(
        "Matchmaking processor started (tick {:?}, threshold {})",
        config.matchmaking_tick, config.pairing_weight_threshold
    );

    tokio::select! {
        _ = processor.run() => {}
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutting down matchmaking processor");
        }
    }

    Ok(())
}
