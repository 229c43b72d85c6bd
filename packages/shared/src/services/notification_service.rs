use std::sync::Arc;
use tracing::{error, info};

use crate::models::notification::Notification;
use crate::repositories::notification_repository::NotificationSink;

#[derive(Clone)]
pub struct NotificationService {
    sink: Arc<dyn NotificationSink + Send + Sync>,
}

impl NotificationService {
    pub fn new(sink: Arc<dyn NotificationSink + Send + Sync>) -> Self {
        Self { sink }
    }

    /// Delivery failures are logged; the state change that produced the
    /// notification has already happened and stands.
    pub async fn publish(&self, notification: Notification) {
        let kind = notification.kind();
        let recipients = notification.recipients();
        info!("Publishing {} to {:?}", kind, recipients);

        if let Err(e) = self.sink.publish(notification).await {
            error!("Failed to publish {} to {:?}: {}", kind, recipients, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::challenge::Challenge;
    use crate::models::time_control::TimeControl;
    use crate::repositories::notification_repository::ChannelNotificationSink;

    #[tokio::test]
    async fn test_publish_forwards_to_sink() {
        let (sink, mut receiver) = ChannelNotificationSink::new();
        let service = NotificationService::new(Arc::new(sink));
        let notification = Notification::ChallengeRevoked {
            challenge: Challenge::new("k1", "k2", TimeControl::RAPID),
        };

        service.publish(notification.clone()).await;

        assert_eq!(receiver.try_recv().unwrap(), notification);
    }

    #[tokio::test]
    async fn test_publish_survives_closed_sink() {
        let (sink, receiver) = ChannelNotificationSink::new();
        drop(receiver);
        let service = NotificationService::new(Arc::new(sink));

        service
            .publish(Notification::ChallengeRevoked {
                challenge: Challenge::new("k1", "k2", TimeControl::RAPID),
            })
            .await;
    }
}
