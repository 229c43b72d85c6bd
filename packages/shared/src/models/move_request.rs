use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::services::errors::chess_service_errors::ChessServiceError;

/// A move in coordinate notation, e.g. `e2e4` or `a7a8q`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveRequest {
    pub from_square: String,             // e.g., "e2"
    pub to_square: String,               // e.g., "e4"
    pub promotion_piece: Option<String>, // e.g., "q" for queen
}

impl MoveRequest {
    pub fn new(from_square: &str, to_square: &str) -> Self {
        MoveRequest {
            from_square: from_square.to_string(),
            to_square: to_square.to_string(),
            promotion_piece: None,
        }
    }

    pub fn with_promotion(from_square: &str, to_square: &str, promotion_piece: &str) -> Self {
        MoveRequest {
            from_square: from_square.to_string(),
            to_square: to_square.to_string(),
            promotion_piece: Some(promotion_piece.to_string()),
        }
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from_square, self.to_square)?;
        if let Some(piece) = &self.promotion_piece {
            write!(f, "{}", piece)?;
        }
        Ok(())
    }
}

impl FromStr for MoveRequest {
    type Err = ChessServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_ascii() || !(s.len() == 4 || s.len() == 5) {
            return Err(ChessServiceError::ValidationError(format!(
                "Invalid move notation: {}",
                s
            )));
        }

        let (from_square, rest) = s.split_at(2);
        let (to_square, promotion) = rest.split_at(2);

        Ok(MoveRequest {
            from_square: from_square.to_string(),
            to_square: to_square.to_string(),
            promotion_piece: (!promotion.is_empty()).then(|| promotion.to_string()),
        })
    }
}
