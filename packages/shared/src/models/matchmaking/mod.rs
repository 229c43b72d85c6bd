use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::client::ClientProfile;

/// A client currently waiting in the matchmaking pool, as seen by the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedClient {
    pub profile: ClientProfile,
    pub joined_at: DateTime<Utc>,
}

impl QueuedClient {
    pub fn new(profile: ClientProfile, joined_at: DateTime<Utc>) -> Self {
        QueuedClient { profile, joined_at }
    }

    pub fn client_key(&self) -> &str {
        &self.profile.client_key
    }

    /// Seconds spent in the pool as of `now`, never negative.
    pub fn wait_seconds(&self, now: DateTime<Utc>) -> f64 {
        let waited = (now - self.joined_at).num_milliseconds() as f64 / 1000.0;
        waited.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_wait_seconds() {
        let now = Utc::now();
        let queued = QueuedClient::new(
            ClientProfile::new("client-1", 1200),
            now - Duration::seconds(42),
        );

        assert_eq!(queued.wait_seconds(now), 42.0);
        assert_eq!(queued.client_key(), "client-1");
    }

    #[test]
    fn test_wait_seconds_clamps_future_join_time() {
        let now = Utc::now();
        let queued = QueuedClient::new(
            ClientProfile::new("client-1", 1200),
            now + Duration::seconds(5),
        );

        assert_eq!(queued.wait_seconds(now), 0.0);
    }
}
