use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::models::notification::Notification;
use crate::repositories::errors::notification_repository_errors::NotificationRepositoryError;

/// Destination for notifications, registered when the registry is built.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, notification: Notification) -> Result<(), NotificationRepositoryError>;
}

/// Hands notifications to the messaging layer through an unbounded channel.
#[derive(Clone)]
pub struct ChannelNotificationSink {
    sender: UnboundedSender<Notification>,
}

impl ChannelNotificationSink {
    pub fn new() -> (Self, UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl NotificationSink for ChannelNotificationSink {
    async fn publish(&self, notification: Notification) -> Result<(), NotificationRepositoryError> {
        self.sender
            .send(notification)
            .map_err(|_| NotificationRepositoryError::ChannelClosed)
    }
}
