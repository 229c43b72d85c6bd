#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueRepositoryError {
    AlreadyQueued,
    NotQueued,
}

impl std::fmt::Display for QueueRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueRepositoryError::AlreadyQueued => write!(f, "Client is already queued"),
            QueueRepositoryError::NotQueued => write!(f, "Client is not queued"),
        }
    }
}

impl std::error::Error for QueueRepositoryError {}
