use chess::{BitBoard, Board, BoardStatus, ChessMove, Piece, Square};
use std::str::FromStr;

use crate::{
    models::{
        move_request::MoveRequest,
        position::{BoardOutcome, Position},
    },
    services::errors::chess_service_errors::ChessServiceError,
};

/// The rules of chess as seen by the registry: a legality predicate and a
/// move application. Both are pure.
pub trait ChessOracle {
    fn is_legal_move(&self, position: &Position, move_request: &MoveRequest) -> bool;

    /// Applies a move already known to be legal. An unparseable move leaves the
    /// position unchanged.
    fn apply_move(&self, position: &Position, move_request: &MoveRequest) -> Position;
}

#[derive(Clone, Debug, Default)]
pub struct ChessService;

impl ChessService {
    pub fn new() -> Self {
        ChessService
    }

    pub fn parse_move(move_request: &MoveRequest) -> Result<ChessMove, ChessServiceError> {
        let from_sq = Square::from_str(&move_request.from_square)
            .map_err(|_| ChessServiceError::ValidationError("Invalid from square".to_string()))?;
        let to_sq = Square::from_str(&move_request.to_square)
            .map_err(|_| ChessServiceError::ValidationError("Invalid to square".to_string()))?;

        let promotion = match &move_request.promotion_piece {
            Some(p) => match p.to_ascii_lowercase().as_str() {
                "q" => Some(Piece::Queen),
                "r" => Some(Piece::Rook),
                "b" => Some(Piece::Bishop),
                "n" => Some(Piece::Knight),
                _ => {
                    return Err(ChessServiceError::ValidationError(
                        "Invalid promotion piece".to_string(),
                    ))
                }
            },
            None => None,
        };

        Ok(ChessMove::new(from_sq, to_sq, promotion))
    }

    /// Legal moves for the position in coordinate notation.
    pub fn legal_moves(position: &Position) -> Vec<String> {
        chess::MoveGen::new_legal(position.board())
            .map(|m| format!("{}{}", m.get_source(), m.get_dest()))
            .collect()
    }

    fn evaluate(board: &Board, halfmove_clock: u32, repetitions: &[u64]) -> Option<BoardOutcome> {
        match board.status() {
            BoardStatus::Checkmate => {
                // The side to move is mated, so the other side delivered it.
                return Some(BoardOutcome::Checkmate {
                    winner: !board.side_to_move(),
                });
            }
            BoardStatus::Stalemate => return Some(BoardOutcome::Stalemate),
            BoardStatus::Ongoing => {}
        }

        if Self::has_insufficient_material(board) {
            return Some(BoardOutcome::InsufficientMaterial);
        }

        if halfmove_clock >= 100 {
            return Some(BoardOutcome::FiftyMoveRule);
        }

        let current = board.get_hash();
        if repetitions.iter().filter(|hash| **hash == current).count() >= 3 {
            return Some(BoardOutcome::ThreefoldRepetition);
        }

        None
    }

    /// K v K, K+minor v K, and bishops-only positions with every bishop on one square colour.
    fn has_insufficient_material(board: &Board) -> bool {
        let heavy = *board.pieces(Piece::Pawn) | *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
        if heavy.popcnt() > 0 {
            return false;
        }

        let total = board.combined().popcnt();
        if total <= 3 {
            return true;
        }

        if board.pieces(Piece::Knight).popcnt() > 0 {
            return false;
        }

        let bishops: BitBoard = *board.pieces(Piece::Bishop);
        let mut colours =
            bishops.map(|sq| (sq.get_rank().to_index() + sq.get_file().to_index()) % 2);
        match colours.next() {
            Some(first) => colours.all(|colour| colour == first),
            None => true,
        }
    }
}

impl ChessOracle for ChessService {
    fn is_legal_move(&self, position: &Position, move_request: &MoveRequest) -> bool {
        if position.outcome().is_some() {
            return false;
        }

        match Self::parse_move(move_request) {
            Ok(chess_move) => chess::MoveGen::new_legal(position.board()).any(|m| m == chess_move),
            Err(_) => false,
        }
    }

    fn apply_move(&self, position: &Position, move_request: &MoveRequest) -> Position {
        let chess_move = match Self::parse_move(move_request) {
            Ok(chess_move) => chess_move,
            Err(_) => return position.clone(),
        };

        let board = position.board();
        let irreversible = board.piece_on(chess_move.get_source()) == Some(Piece::Pawn)
            || board.piece_on(chess_move.get_dest()).is_some();

        let new_board = board.make_move_new(chess_move);

        let halfmove_clock = if irreversible {
            0
        } else {
            position.halfmove_clock() + 1
        };
        let fullmove_number = match board.side_to_move() {
            chess::Color::White => position.fullmove_number(),
            chess::Color::Black => position.fullmove_number() + 1,
        };

        let mut repetitions = if irreversible {
            Vec::new()
        } else {
            position.repetitions().to_vec()
        };
        repetitions.push(new_board.get_hash());

        let outcome = Self::evaluate(&new_board, halfmove_clock, &repetitions);

        Position::from_parts(
            new_board,
            halfmove_clock,
            fullmove_number,
            repetitions,
            outcome,
        )
    }
}
