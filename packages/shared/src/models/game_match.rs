use chess::Color;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::challenge::Challenge;
use crate::models::client::ClientKey;
use crate::models::position::{BoardOutcome, Position};
use crate::models::time_control::TimeControl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchResult {
    InProgress,
    WhiteWinsByCheckmate,
    BlackWinsByCheckmate,
    WhiteWinsByTimeout,
    BlackWinsByTimeout,
    WhiteWinsByResignation,
    BlackWinsByResignation,
    DrawByStalemate,
    DrawByInsufficientMaterial,
    DrawByFiftyMoveRule,
    DrawByThreefoldRepetition,
}

impl MatchResult {
    pub fn is_terminal(&self) -> bool {
        *self != MatchResult::InProgress
    }

    pub fn timeout_win_for(winner: Color) -> Self {
        match winner {
            Color::White => MatchResult::WhiteWinsByTimeout,
            Color::Black => MatchResult::BlackWinsByTimeout,
        }
    }

    pub fn resignation_win_for(winner: Color) -> Self {
        match winner {
            Color::White => MatchResult::WhiteWinsByResignation,
            Color::Black => MatchResult::BlackWinsByResignation,
        }
    }

    pub fn from_outcome(outcome: Option<BoardOutcome>) -> Self {
        match outcome {
            None => MatchResult::InProgress,
            Some(BoardOutcome::Checkmate {
                winner: Color::White,
            }) => MatchResult::WhiteWinsByCheckmate,
            Some(BoardOutcome::Checkmate {
                winner: Color::Black,
            }) => MatchResult::BlackWinsByCheckmate,
            Some(BoardOutcome::Stalemate) => MatchResult::DrawByStalemate,
            Some(BoardOutcome::InsufficientMaterial) => MatchResult::DrawByInsufficientMaterial,
            Some(BoardOutcome::FiftyMoveRule) => MatchResult::DrawByFiftyMoveRule,
            Some(BoardOutcome::ThreefoldRepetition) => MatchResult::DrawByThreefoldRepetition,
        }
    }
}

/// An authoritative match. Participants and time control never change after
/// creation; position, clocks, `last_move_time` and `result` do.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub match_id: Uuid,
    pub position: Position,
    pub white_client_key: ClientKey,
    pub white_time_remaining_sec: f64,
    pub black_client_key: ClientKey,
    pub black_time_remaining_sec: f64,
    pub time_control: TimeControl,
    pub last_move_time: DateTime<Utc>,
    pub result: MatchResult,
    /// Bumped by the registry on every successful write; clocks use it to detect staleness.
    pub generation: u64,
    pub move_history: Vec<String>,
}

impl Match {
    pub fn new(
        white_client_key: &str,
        black_client_key: &str,
        time_control: TimeControl,
        started_at: DateTime<Utc>,
    ) -> Self {
        Match {
            match_id: Uuid::new_v4(),
            position: Position::default(),
            white_client_key: white_client_key.to_string(),
            white_time_remaining_sec: time_control.initial_time_secs(),
            black_client_key: black_client_key.to_string(),
            black_time_remaining_sec: time_control.initial_time_secs(),
            time_control,
            last_move_time: started_at,
            result: MatchResult::InProgress,
            generation: 0,
            move_history: vec![],
        }
    }

    pub fn with_random_colours(
        first_client_key: &str,
        second_client_key: &str,
        time_control: TimeControl,
        started_at: DateTime<Utc>,
    ) -> Self {
        if rand::thread_rng().gen_bool(0.5) {
            Match::new(first_client_key, second_client_key, time_control, started_at)
        } else {
            Match::new(second_client_key, first_client_key, time_control, started_at)
        }
    }

    pub fn from_challenge(challenge: &Challenge, started_at: DateTime<Utc>) -> Self {
        let challenger = challenge.challenger_key.as_str();
        let challenged = challenge.challenged_key.as_str();

        match challenge.requested_challenger_white() {
            Some(true) => Match::new(challenger, challenged, challenge.time_control, started_at),
            Some(false) => Match::new(challenged, challenger, challenge.time_control, started_at),
            None => {
                Match::with_random_colours(challenger, challenged, challenge.time_control, started_at)
            }
        }
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    pub fn client_key(&self, colour: Color) -> &str {
        match colour {
            Color::White => &self.white_client_key,
            Color::Black => &self.black_client_key,
        }
    }

    pub fn colour_of(&self, client_key: &str) -> Option<Color> {
        if self.white_client_key == client_key {
            Some(Color::White)
        } else if self.black_client_key == client_key {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn time_remaining(&self, colour: Color) -> f64 {
        match colour {
            Color::White => self.white_time_remaining_sec,
            Color::Black => self.black_time_remaining_sec,
        }
    }

    pub fn set_time_remaining(&mut self, colour: Color, seconds: f64) {
        let seconds = seconds.max(0.0);
        match colour {
            Color::White => self.white_time_remaining_sec = seconds,
            Color::Black => self.black_time_remaining_sec = seconds,
        }
    }

    pub fn participants(&self) -> Vec<ClientKey> {
        vec![self.white_client_key.clone(), self.black_client_key.clone()]
    }

    pub fn is_terminal(&self) -> bool {
        self.result.is_terminal()
    }

    /// True when participants and time control match `other`.
    pub fn has_same_identity(&self, other: &Match) -> bool {
        self.white_client_key == other.white_client_key
            && self.black_client_key == other.black_client_key
            && self.time_control == other.time_control
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_match_fields() {
        let now = Utc::now();
        let new_match = Match::new("white", "black", TimeControl::BULLET, now);

        assert_eq!(new_match.white_client_key, "white");
        assert_eq!(new_match.black_client_key, "black");
        assert_eq!(new_match.white_time_remaining_sec, 60.0);
        assert_eq!(new_match.black_time_remaining_sec, 60.0);
        assert_eq!(new_match.last_move_time, now);
        assert_eq!(new_match.result, MatchResult::InProgress);
        assert_eq!(new_match.side_to_move(), Color::White);
        assert!(new_match.move_history.is_empty());
    }

    #[test]
    fn test_match_id_uniqueness() {
        let now = Utc::now();
        let first = Match::new("a", "b", TimeControl::BLITZ, now);
        let second = Match::new("a", "b", TimeControl::BLITZ, now);

        assert_ne!(first.match_id, second.match_id);
    }

    #[test]
    fn test_from_challenge_respects_colour_flags() {
        let now = Utc::now();
        let as_white = Challenge::new("k1", "k2", TimeControl::RAPID).as_white();
        let as_black = Challenge::new("k1", "k2", TimeControl::RAPID).as_black();

        let white_match = Match::from_challenge(&as_white, now);
        assert_eq!(white_match.white_client_key, "k1");
        assert_eq!(white_match.black_client_key, "k2");
        assert_eq!(white_match.time_control, TimeControl::RAPID);

        let black_match = Match::from_challenge(&as_black, now);
        assert_eq!(black_match.white_client_key, "k2");
        assert_eq!(black_match.black_client_key, "k1");
    }

    #[test]
    fn test_random_colours_keep_both_participants() {
        let new_match = Match::with_random_colours("a", "b", TimeControl::BLITZ, Utc::now());
        let mut participants = new_match.participants();
        participants.sort();

        assert_eq!(participants, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_time_remaining_is_clamped() {
        let mut new_match = Match::new("a", "b", TimeControl::BULLET, Utc::now());
        new_match.set_time_remaining(Color::Black, -3.5);

        assert_eq!(new_match.time_remaining(Color::Black), 0.0);
        assert_eq!(new_match.time_remaining(Color::White), 60.0);
    }

    #[test]
    fn test_identity_comparison() {
        let original = Match::new("a", "b", TimeControl::BLITZ, Utc::now());

        let mut moved = original.clone();
        moved.white_time_remaining_sec = 10.0;
        assert!(original.has_same_identity(&moved));

        let mut swapped = original.clone();
        swapped.black_client_key = "c".to_string();
        assert!(!original.has_same_identity(&swapped));

        let mut retimed = original.clone();
        retimed.time_control = TimeControl::BULLET;
        assert!(!original.has_same_identity(&retimed));
    }

    #[test]
    fn test_result_helpers() {
        assert!(!MatchResult::InProgress.is_terminal());
        assert_eq!(
            MatchResult::timeout_win_for(Color::Black),
            MatchResult::BlackWinsByTimeout
        );
        assert_eq!(
            MatchResult::resignation_win_for(Color::White),
            MatchResult::WhiteWinsByResignation
        );
        assert_eq!(
            MatchResult::from_outcome(Some(BoardOutcome::Stalemate)),
            MatchResult::DrawByStalemate
        );
        assert_eq!(MatchResult::from_outcome(None), MatchResult::InProgress);
    }
}
