use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchServiceError {
    SelfChallenge,
    Unavailable,
    DuplicateChallenge,
    ChallengeNotFound,
    ParticipantUnavailable,
    MatchNotFound,
    IllegalMove,
    ImmutableFieldChanged,
    NotParticipant,
}

impl fmt::Display for MatchServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatchServiceError::SelfChallenge => write!(f, "Cannot challenge yourself"),
            MatchServiceError::Unavailable => {
                write!(f, "Challenger cannot start a match right now")
            }
            MatchServiceError::DuplicateChallenge => {
                write!(f, "An open challenge already exists for this player")
            }
            MatchServiceError::ChallengeNotFound => write!(f, "Challenge not found"),
            MatchServiceError::ParticipantUnavailable => {
                write!(f, "A participant is already playing another match")
            }
            MatchServiceError::MatchNotFound => write!(f, "Match not found"),
            MatchServiceError::IllegalMove => write!(f, "Move is not legal"),
            MatchServiceError::ImmutableFieldChanged => {
                write!(f, "Match participants and time control cannot change")
            }
            MatchServiceError::NotParticipant => {
                write!(f, "Client is not a participant of this match")
            }
        }
    }
}

impl std::error::Error for MatchServiceError {}
