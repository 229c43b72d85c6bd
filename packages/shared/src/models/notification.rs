use serde::Serialize;
use uuid::Uuid;

use crate::models::challenge::Challenge;
use crate::models::client::ClientKey;
use crate::models::game_match::Match;

/// Outcomes pushed to the messaging layer for delivery to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    MatchCreated {
        chess_match: Match,
    },
    MatchUpdated {
        chess_match: Match,
    },
    MatchEnded {
        chess_match: Match,
    },
    MatchCreationFailed {
        chess_match: Match,
        reason: String,
    },
    ChallengeCreated {
        challenge: Challenge,
    },
    ChallengeDenied {
        challenge: Challenge,
    },
    ChallengeRevoked {
        challenge: Challenge,
    },
    ChallengeAccepted {
        challenge: Challenge,
    },
    ChallengeRequestFailed {
        challenge: Challenge,
        reason: String,
    },
    MoveFailure {
        match_id: Uuid,
        chess_move: String,
        reason: String,
        /// Empty when the match is unknown; the transport then answers the sender only.
        participants: Vec<ClientKey>,
    },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::MatchCreated { .. } => "match_created",
            Notification::MatchUpdated { .. } => "match_updated",
            Notification::MatchEnded { .. } => "match_ended",
            Notification::MatchCreationFailed { .. } => "match_creation_failed",
            Notification::ChallengeCreated { .. } => "challenge_created",
            Notification::ChallengeDenied { .. } => "challenge_denied",
            Notification::ChallengeRevoked { .. } => "challenge_revoked",
            Notification::ChallengeAccepted { .. } => "challenge_accepted",
            Notification::ChallengeRequestFailed { .. } => "challenge_request_failed",
            Notification::MoveFailure { .. } => "move_failure",
        }
    }

    /// Clients that should receive this notification.
    pub fn recipients(&self) -> Vec<ClientKey> {
        match self {
            Notification::MatchCreated { chess_match }
            | Notification::MatchUpdated { chess_match }
            | Notification::MatchEnded { chess_match }
            | Notification::MatchCreationFailed { chess_match, .. } => chess_match.participants(),
            Notification::ChallengeCreated { challenge }
            | Notification::ChallengeDenied { challenge }
            | Notification::ChallengeRevoked { challenge }
            | Notification::ChallengeAccepted { challenge } => vec![
                challenge.challenger_key.clone(),
                challenge.challenged_key.clone(),
            ],
            Notification::ChallengeRequestFailed { challenge, .. } => {
                vec![challenge.challenger_key.clone()]
            }
            Notification::MoveFailure { participants, .. } => participants.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time_control::TimeControl;
    use chrono::Utc;

    #[test]
    fn test_challenge_notifications_reach_both_parties() {
        let challenge = Challenge::new("k1", "k2", TimeControl::BLITZ);
        let notification = Notification::ChallengeDenied {
            challenge: challenge.clone(),
        };

        assert_eq!(
            notification.recipients(),
            vec!["k1".to_string(), "k2".to_string()]
        );

        let failed = Notification::ChallengeRequestFailed {
            challenge,
            reason: "Duplicate challenge".to_string(),
        };
        assert_eq!(failed.recipients(), vec!["k1".to_string()]);
    }

    #[test]
    fn test_match_notification_serialization() {
        let chess_match = Match::new("white", "black", TimeControl::BULLET, Utc::now());
        let notification = Notification::MatchCreated { chess_match };

        let json = notification.to_json().unwrap();

        assert!(json.contains("\"type\":\"match_created\""));
        assert!(json.contains("\"white_client_key\":\"white\""));
        assert!(json.contains("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"));
        assert_eq!(notification.kind(), "match_created");
    }

    #[test]
    fn test_move_failure_serialization() {
        let notification = Notification::MoveFailure {
            match_id: Uuid::nil(),
            chess_move: "e2e5".to_string(),
            reason: "Illegal move".to_string(),
            participants: vec![],
        };

        let json = notification.to_json().unwrap();

        assert!(json.contains("\"type\":\"move_failure\""));
        assert!(json.contains("\"chess_move\":\"e2e5\""));
        assert!(notification.recipients().is_empty());
    }
}
