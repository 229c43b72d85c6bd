use std::fmt;

use crate::repositories::errors::queue_repository_errors::QueueRepositoryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueServiceError {
    AlreadyQueued,
    NotQueued,
}

impl fmt::Display for QueueServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QueueServiceError::AlreadyQueued => write!(f, "Client is already in the matchmaking queue"),
            QueueServiceError::NotQueued => write!(f, "Client is not in the matchmaking queue"),
        }
    }
}

impl std::error::Error for QueueServiceError {}

impl From<QueueRepositoryError> for QueueServiceError {
    fn from(error: QueueRepositoryError) -> Self {
        match error {
            QueueRepositoryError::AlreadyQueued => QueueServiceError::AlreadyQueued,
            QueueRepositoryError::NotQueued => QueueServiceError::NotQueued,
        }
    }
}
