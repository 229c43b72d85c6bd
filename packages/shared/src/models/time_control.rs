use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::services::errors::chess_service_errors::ChessServiceError;

/// Clock settings for a match. Compared structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeControl {
    pub initial_time_sec: u32,
    /// Fischer increment added after every completed move.
    pub increment_sec: u32,
    /// Move number after which `sec_after_moves` is added once. Zero disables it.
    pub time_after_moves_count: u32,
    pub sec_after_moves: u32,
}

impl TimeControl {
    pub const BULLET: TimeControl = TimeControl::new(60, 0, 0, 0);
    pub const BLITZ: TimeControl = TimeControl::new(300, 3, 0, 0);
    pub const RAPID: TimeControl = TimeControl::new(900, 10, 0, 0);
    pub const CLASSICAL: TimeControl = TimeControl::new(5400, 30, 40, 1800);

    pub const fn new(
        initial_time_sec: u32,
        increment_sec: u32,
        time_after_moves_count: u32,
        sec_after_moves: u32,
    ) -> Self {
        TimeControl {
            initial_time_sec,
            increment_sec,
            time_after_moves_count,
            sec_after_moves,
        }
    }

    pub fn initial_time_secs(&self) -> f64 {
        f64::from(self.initial_time_sec)
    }

    /// Time credited to a side after it completes its `move_number`-th move.
    pub fn bonus_after_move(&self, move_number: u32) -> f64 {
        let mut bonus = f64::from(self.increment_sec);
        if self.time_after_moves_count > 0 && move_number == self.time_after_moves_count {
            bonus += f64::from(self.sec_after_moves);
        }
        bonus
    }
}

impl Default for TimeControl {
    fn default() -> Self {
        TimeControl::BLITZ
    }
}

impl fmt::Display for TimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.initial_time_sec / 60, self.increment_sec)
    }
}

/// Accepts a preset name (`bullet`, `blitz`, `rapid`, `classical`) or
/// `minutes+increment` such as `5+3`.
impl FromStr for TimeControl {
    type Err = ChessServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bullet" => return Ok(TimeControl::BULLET),
            "blitz" => return Ok(TimeControl::BLITZ),
            "rapid" => return Ok(TimeControl::RAPID),
            "classical" => return Ok(TimeControl::CLASSICAL),
            _ => {}
        }

        let invalid = || ChessServiceError::ValidationError(format!("Invalid time control: {}", s));
        let (minutes, increment) = s.trim().split_once('+').ok_or_else(invalid)?;
        let minutes: u32 = minutes.trim().parse().map_err(|_| invalid())?;
        let increment: u32 = increment.trim().parse().map_err(|_| invalid())?;
        if minutes == 0 {
            return Err(invalid());
        }

        Ok(TimeControl::new(minutes * 60, increment, 0, 0))
    }
}
