use std::fmt;
use std::str::FromStr;

use chess::{Board, Color};
use serde::{Serialize, Serializer};

use crate::services::errors::chess_service_errors::ChessServiceError;

/// How the rules ended the game on the board, independent of clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardOutcome {
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
}

/// Board state of a match: piece placement plus the counters the `chess`
/// crate does not track (half-move clock, full-move number, repetitions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
    // Hashes of every position since the last capture or pawn move, current one last.
    repetitions: Vec<u64>,
    outcome: Option<BoardOutcome>,
}

impl Position {
    pub(crate) fn from_parts(
        board: Board,
        halfmove_clock: u32,
        fullmove_number: u32,
        repetitions: Vec<u64>,
        outcome: Option<BoardOutcome>,
    ) -> Self {
        Position {
            board,
            halfmove_clock,
            fullmove_number,
            repetitions,
            outcome,
        }
    }

    /// Builds a position from a full FEN string. Missing counters default to `0 1`.
    pub fn from_fen(fen: &str) -> Result<Self, ChessServiceError> {
        let board = Board::from_str(fen)
            .map_err(|e| ChessServiceError::InvalidPosition(format!("Invalid FEN: {}", e)))?;

        let fields: Vec<&str> = fen.split_whitespace().collect();
        let halfmove_clock = fields.get(4).and_then(|s| s.parse().ok()).unwrap_or(0);
        let fullmove_number = fields.get(5).and_then(|s| s.parse().ok()).unwrap_or(1);

        Ok(Position::from_parts(
            board,
            halfmove_clock,
            fullmove_number,
            vec![board.get_hash()],
            None,
        ))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn repetitions(&self) -> &[u64] {
        &self.repetitions
    }

    pub fn outcome(&self) -> Option<BoardOutcome> {
        self.outcome
    }

    pub fn to_fen(&self) -> String {
        // The crate prints fixed counters, so keep only placement, side, castling, en passant.
        let board_fen = self.board.to_string();
        let fields: Vec<&str> = board_fen.split_whitespace().take(4).collect();
        format!(
            "{} {} {}",
            fields.join(" "),
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

impl Default for Position {
    fn default() -> Self {
        let board = Board::default();
        Position::from_parts(board, 0, 1, vec![board.get_hash()], None)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_default_is_starting_position() {
        let position = Position::default();

        assert_eq!(position.to_fen(), START_FEN);
        assert_eq!(position.side_to_move(), Color::White);
        assert_eq!(position.fullmove_number(), 1);
        assert!(position.outcome().is_none());
    }

    #[test]
    fn test_from_fen_keeps_counters() {
        let position = Position::from_fen("8/P7/8/8/8/8/8/K6k w - - 12 40").unwrap();

        assert_eq!(position.halfmove_clock(), 12);
        assert_eq!(position.fullmove_number(), 40);
        assert_eq!(position.to_fen(), "8/P7/8/8/8/8/8/K6k w - - 12 40");
    }

    #[test]
    fn test_from_fen_rejects_garbage() {
        assert!(Position::from_fen("not a fen").is_err());
    }

    #[test]
    fn test_serializes_as_fen() {
        let serialized = serde_json::to_string(&Position::default()).unwrap();

        assert_eq!(serialized, format!("\"{}\"", START_FEN));
    }
}
