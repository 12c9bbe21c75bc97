//! [`RulesEngine`] backed by the `shakmaty` crate (standard chess only).

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{CastlingMode, Chess, Color, File, Move, Position, Role};

use super::{MoveDescriptor, MoveKind, RulesEngine};
use crate::error::{NotationError, NotationErrorKind};
use crate::types::{Piece, PieceKind, Side, Square};

#[derive(Debug, Clone, Copy, Default)]
pub struct ShakmatyEngine;

impl ShakmatyEngine {
    pub fn new() -> Self {
        Self
    }

    fn describe(&self, position: &Chess, m: &Move) -> Option<MoveDescriptor> {
        let side = side_of(position.turn());
        match *m {
            Move::Normal {
                role,
                from,
                capture,
                to,
                promotion,
            } => Some(MoveDescriptor {
                from: square_from(from),
                to: square_from(to),
                piece: Piece::new(side, kind_of(role)),
                captured: capture.map(|r| Piece::new(side.other(), kind_of(r))),
                promotion: promotion.map(kind_of),
                kind: MoveKind::Normal,
            }),
            Move::EnPassant { from, to } => Some(MoveDescriptor {
                from: square_from(from),
                to: square_from(to),
                piece: Piece::new(side, PieceKind::Pawn),
                captured: Some(Piece::new(side.other(), PieceKind::Pawn)),
                promotion: None,
                kind: MoveKind::EnPassant {
                    captured_square: square_from(shakmaty::Square::from_coords(to.file(), from.rank())),
                },
            }),
            Move::Castle { king, rook } => {
                let (king_file, rook_file) = if rook.file() > king.file() {
                    (File::G, File::F)
                } else {
                    (File::C, File::D)
                };
                Some(MoveDescriptor {
                    from: square_from(king),
                    to: square_from(shakmaty::Square::from_coords(king_file, king.rank())),
                    piece: Piece::new(side, PieceKind::King),
                    captured: None,
                    promotion: None,
                    kind: MoveKind::Castle {
                        rook_from: square_from(rook),
                        rook_to: square_from(shakmaty::Square::from_coords(rook_file, king.rank())),
                    },
                })
            }
            Move::Put { .. } => None,
        }
    }

    /// The engine move matching a descriptor, if it is legal in `position`.
    fn find_move(&self, position: &Chess, mv: &MoveDescriptor) -> Option<Move> {
        position
            .legal_moves()
            .iter()
            .find(|m| self.describe(position, m).as_ref() == Some(mv))
            .cloned()
    }

    fn parse_uci(&self, position: &Chess, notation: &str) -> Option<MoveDescriptor> {
        if !notation.is_ascii() || !(4..=5).contains(&notation.len()) {
            return None;
        }
        let from = Square::parse(&notation[0..2])?;
        let to = Square::parse(&notation[2..4])?;
        let promotion = match notation.chars().nth(4) {
            Some(c) => Some(PieceKind::from_code(c)?),
            None => None,
        };
        self.moves_between(position, from, to)
            .into_iter()
            .find(|mv| mv.promotion == promotion)
    }
}

impl RulesEngine for ShakmatyEngine {
    type Position = Chess;

    fn parse_position(&self, fen: &str) -> Result<Chess, NotationError> {
        let text = fen.trim();
        let parsed: Fen = text.parse().map_err(|e| {
            let mut err = NotationError::new(NotationErrorKind::InvalidFen, format!("Invalid FEN string: {e}"));
            if let Some(index) = locate_board_error(text) {
                err = err.at(index, 1);
            }
            err
        })?;
        parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| NotationError::new(NotationErrorKind::InvalidFen, format!("Illegal position: {e}")))
    }

    fn start_position(&self) -> Chess {
        Chess::default()
    }

    fn piece_at(&self, position: &Chess, square: Square) -> Option<Piece> {
        position
            .board()
            .piece_at(square_to(square))
            .map(|p| Piece::new(side_of(p.color), kind_of(p.role)))
    }

    fn turn(&self, position: &Chess) -> Side {
        side_of(position.turn())
    }

    fn legal_moves_from(&self, position: &Chess, from: Square) -> Vec<MoveDescriptor> {
        let origin = square_to(from);
        position
            .legal_moves()
            .iter()
            .filter(|m| m.from() == Some(origin))
            .filter_map(|m| self.describe(position, m))
            .collect()
    }

    fn apply_move(&self, position: &Chess, mv: &MoveDescriptor) -> Result<Chess, NotationError> {
        let m = self.find_move(position, mv).ok_or_else(|| {
            NotationError::new(NotationErrorKind::InvalidMove, format!("Illegal move {}", mv.uci()))
        })?;
        let mut next = position.clone();
        next.play_unchecked(&m);
        Ok(next)
    }

    fn format_move(&self, position: &Chess, mv: &MoveDescriptor) -> String {
        match self.find_move(position, mv) {
            Some(m) => SanPlus::from_move(position.clone(), &m).to_string(),
            None => mv.uci(),
        }
    }

    fn parse_move(&self, position: &Chess, notation: &str) -> Result<MoveDescriptor, NotationError> {
        let notation = notation.trim();
        let invalid = || NotationError::new(NotationErrorKind::InvalidMove, format!("Invalid move notation `{notation}`"));

        if let Ok(san) = notation.parse::<SanPlus>()
            && let Ok(m) = san.san.to_move(position)
        {
            return self.describe(position, &m).ok_or_else(invalid);
        }
        self.parse_uci(position, notation).ok_or_else(invalid)
    }
}

/// Offset of the first character of the board field that cannot appear in a
/// FEN board description.
fn locate_board_error(fen: &str) -> Option<usize> {
    let board_field = fen.split(' ').next()?;
    board_field
        .chars()
        .enumerate()
        .find(|(_, c)| !matches!(c, 'p' | 'n' | 'b' | 'r' | 'q' | 'k' | 'P' | 'N' | 'B' | 'R' | 'Q' | 'K' | '1'..='8' | '/'))
        .map(|(i, _)| i)
}

fn square_to(square: Square) -> shakmaty::Square {
    shakmaty::Square::new(u32::from(square.index()))
}

fn square_from(square: shakmaty::Square) -> Square {
    Square::masked(u32::from(square))
}

fn side_of(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

fn kind_of(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}
