use serde::{Deserialize, Serialize};

use crate::models::client::ClientKey;
use crate::models::time_control::TimeControl;

/// An open invitation from one client to another. At most one exists per
/// ordered (challenger, challenged) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub challenger_key: ClientKey,
    pub challenged_key: ClientKey,
    pub is_challenger_white: bool,
    pub is_challenger_black: bool,
    pub time_control: TimeControl,
}

impl Challenge {
    pub fn new(challenger_key: &str, challenged_key: &str, time_control: TimeControl) -> Self {
        Challenge {
            challenger_key: challenger_key.to_string(),
            challenged_key: challenged_key.to_string(),
            is_challenger_white: false,
            is_challenger_black: false,
            time_control,
        }
    }

    pub fn as_white(mut self) -> Self {
        self.is_challenger_white = true;
        self.is_challenger_black = false;
        self
    }

    pub fn as_black(mut self) -> Self {
        self.is_challenger_white = false;
        self.is_challenger_black = true;
        self
    }

    /// Colour requested by the challenger: `Some(true)` for white, `Some(false)`
    /// for black, `None` when the flags leave it open.
    pub fn requested_challenger_white(&self) -> Option<bool> {
        match (self.is_challenger_white, self.is_challenger_black) {
            (true, false) => Some(true),
            (false, true) => Some(false),
            _ => None,
        }
    }
}

/// Terminal states of a challenge. The record is removed on any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeResolution {
    Accepted,
    Declined,
    Revoked,
}
