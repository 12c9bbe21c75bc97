//! Display of SAN with localized piece letters or figurines.

use serde::{Deserialize, Serialize};

use crate::types::{PieceKind, Side};

/// How piece letters are shown in move text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PieceSymbols {
    /// English SAN letters, unchanged.
    #[default]
    Native,
    /// Replacement letters for king, queen, rook, bishop and knight.
    Localized([String; 5]),
    /// Unicode chess figurines in the color of the moving side.
    Figurines,
}

impl PieceSymbols {
    /// French letters, `R D T F C`.
    pub fn french() -> Self {
        PieceSymbols::Localized(["R", "D", "T", "F", "C"].map(String::from))
    }

    /// German letters, `K D T L S`.
    pub fn german() -> Self {
        PieceSymbols::Localized(["K", "D", "T", "L", "S"].map(String::from))
    }

    fn symbol(&self, kind: PieceKind, side: Side) -> Option<String> {
        let slot = match kind {
            PieceKind::King => 0,
            PieceKind::Queen => 1,
            PieceKind::Rook => 2,
            PieceKind::Bishop => 3,
            PieceKind::Knight => 4,
            PieceKind::Pawn => return None,
        };
        match self {
            PieceSymbols::Native => None,
            PieceSymbols::Localized(letters) => Some(letters[slot].clone()),
            PieceSymbols::Figurines => {
                let white = ['\u{2654}', '\u{2655}', '\u{2656}', '\u{2657}', '\u{2658}'];
                let black = ['\u{265A}', '\u{265B}', '\u{265C}', '\u{265D}', '\u{265E}'];
                let glyph = match side {
                    Side::White => white[slot],
                    Side::Black => black[slot],
                };
                Some(glyph.to_string())
            }
        }
    }
}

/// Rewrites the piece letters of a SAN string played by `side`.
pub fn format_move(san: &str, side: Side, symbols: &PieceSymbols) -> String {
    if *symbols == PieceSymbols::Native {
        return san.to_string();
    }
    let mut out = String::with_capacity(san.len() + 4);
    for c in san.chars() {
        let kind = if c.is_ascii_uppercase() && c != 'O' {
            PieceKind::from_code(c)
        } else {
            None
        };
        match kind.and_then(|kind| symbols.symbol(kind, side)) {
            Some(symbol) => out.push_str(&symbol),
            None => out.push(c),
        }
    }
    out
}
