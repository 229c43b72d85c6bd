use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::debug;
use uuid::Uuid;

use crate::services::match_service::MatchService;

/// Sleeps for the side to move's remaining time, then asks the registry to
/// flag it. The returned handle cancels the wait.
pub(crate) fn spawn(
    service: MatchService,
    match_id: Uuid,
    generation: u64,
    wait_secs: f64,
) -> AbortHandle {
    let wait = Duration::from_secs_f64(wait_secs.max(0.0));
    debug!(
        "Clock for match {} (generation {}) set to {:.1}s",
        match_id, generation, wait_secs
    );

    tokio::spawn(async move {
        tokio::time::sleep(wait).await;
        service.expire_clock(match_id, generation).await;
    })
    .abort_handle()
}
