#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationRepositoryError {
    ChannelClosed,
}

impl std::fmt::Display for NotificationRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationRepositoryError::ChannelClosed => {
                write!(f, "Notification channel is closed")
            }
        }
    }
}

impl std::error::Error for NotificationRepositoryError {}
