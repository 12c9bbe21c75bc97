//! The rules-engine capability consumed by the board.
//!
//! Board code never inspects positions itself: it asks the engine for pieces,
//! the side to move, legal moves and notation. [`ShakmatyEngine`] is the
//! production implementation; tests may substitute a lighter fake.

use crate::error::NotationError;
use crate::types::{Piece, PieceKind, Side, Square};

mod shakmaty_engine;

pub use shakmaty_engine::ShakmatyEngine;

/// FEN of the standard starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Special effect of a move on pieces other than the mover.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Normal,
    /// The rook travels from `rook_from` to `rook_to`.
    Castle { rook_from: Square, rook_to: Square },
    /// The captured pawn stands on `captured_square`, not on the target.
    EnPassant { captured_square: Square },
}

/// Engine-independent description of a legal move.
///
/// `to` is always the square the moving piece lands on (the king's
/// destination for castling).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MoveDescriptor {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub promotion: Option<PieceKind>,
    pub kind: MoveKind,
}

impl MoveDescriptor {
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    /// Long algebraic form, e.g. `e7e8q`.
    pub fn uci(&self) -> String {
        match self.promotion {
            Some(kind) => format!("{}{}{}", self.from, self.to, kind.code()),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

/// Narrow view of a chess rules library.
pub trait RulesEngine {
    type Position: Clone;

    /// Parses a FEN string. Errors carry [`crate::NotationErrorKind::InvalidFen`].
    fn parse_position(&self, fen: &str) -> Result<Self::Position, NotationError>;

    fn start_position(&self) -> Self::Position;

    fn piece_at(&self, position: &Self::Position, square: Square) -> Option<Piece>;

    fn turn(&self, position: &Self::Position) -> Side;

    /// Legal moves of the piece standing on `from`.
    fn legal_moves_from(&self, position: &Self::Position, from: Square) -> Vec<MoveDescriptor>;

    /// Position after a move previously returned by this engine.
    fn apply_move(&self, position: &Self::Position, mv: &MoveDescriptor) -> Result<Self::Position, NotationError>;

    /// Standard algebraic notation of a legal move, including `+`/`#`.
    fn format_move(&self, position: &Self::Position, mv: &MoveDescriptor) -> String;

    /// Resolves SAN (or UCI) notation against a position.
    fn parse_move(&self, position: &Self::Position, notation: &str) -> Result<MoveDescriptor, NotationError>;

    /// Legal moves going from `from` to `to`; more than one only for promotions.
    fn moves_between(&self, position: &Self::Position, from: Square, to: Square) -> Vec<MoveDescriptor> {
        self.legal_moves_from(position, from)
            .into_iter()
            .filter(|mv| mv.to == to)
            .collect()
    }

    /// Occupied squares with their pieces.
    fn pieces(&self, position: &Self::Position) -> Vec<(Square, Piece)> {
        Square::all()
            .filter_map(|square| self.piece_at(position, square).map(|piece| (square, piece)))
            .collect()
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
