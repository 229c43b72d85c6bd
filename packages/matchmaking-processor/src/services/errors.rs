use shared::{
    models::client::ClientKey,
    services::errors::{
        match_service_errors::MatchServiceError, queue_service_errors::QueueServiceError,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub enum MatchmakingServiceError {
    Unavailable(ClientKey),
    Queue(QueueServiceError),
    Match(MatchServiceError),
}

impl std::fmt::Display for MatchmakingServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchmakingServiceError::Unavailable(client_key) => {
                write!(f, "Client {} cannot start a match", client_key)
            }
            MatchmakingServiceError::Queue(e) => write!(f, "Queue error: {}", e),
            MatchmakingServiceError::Match(e) => write!(f, "Match error: {}", e),
        }
    }
}

impl std::error::Error for MatchmakingServiceError {}

impl From<QueueServiceError> for MatchmakingServiceError {
    fn from(error: QueueServiceError) -> Self {
        MatchmakingServiceError::Queue(error)
    }
}

impl From<MatchServiceError> for MatchmakingServiceError {
    fn from(error: MatchServiceError) -> Self {
        MatchmakingServiceError::Match(error)
    }
}
