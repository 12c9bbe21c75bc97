//! Colors, glyphs and dimensions of the desktop host

use chessboard::theme::Rgb;
use chessboard::{PieceKind, Side};
use iced::Color;

// Pieces
pub const WHITE_PIECE: Color = Color::from_rgb(0.98, 0.98, 0.96);
pub const BLACK_PIECE: Color = Color::from_rgb(0.08, 0.08, 0.08);
pub const PIECE_OUTLINE: Color = Color::from_rgba(0.0, 0.0, 0.0, 0.55);

// Overlays
pub const SELECTED_SQUARE: Color = Color::from_rgba(0.68, 0.85, 0.37, 0.6);
pub const PROMOTION_BACKGROUND: Color = Color::from_rgba(1.0, 1.0, 1.0, 0.92);
pub const LABEL: Color = Color::from_rgb(0.75, 0.75, 0.75);
pub const ERROR_TITLE: Color = Color::from_rgb(0.9, 0.35, 0.35);

// Dimensions
pub const PANEL_WIDTH: f32 = 340.0;
pub const BOARD_PADDING: f32 = 20.0;
pub const WINDOW_SIZE: (f32, f32) = (1100.0, 720.0);
pub const ARROW_OPACITY: f32 = 0.8;
pub const SQUARE_MARKER_OPACITY: f32 = 0.55;

pub fn rgb(color: Rgb) -> Color {
    let [r, g, b] = color.to_unit();
    Color::from_rgb(r, g, b)
}

pub fn with_alpha(color: Color, alpha: f32) -> Color {
    Color { a: alpha, ..color }
}

/// Solid figurine for a piece; the side only changes its fill color.
pub fn piece_glyph(kind: PieceKind) -> char {
    match kind {
        PieceKind::King => '\u{265A}',
        PieceKind::Queen => '\u{265B}',
        PieceKind::Rook => '\u{265C}',
        PieceKind::Bishop => '\u{265D}',
        PieceKind::Knight => '\u{265E}',
        PieceKind::Pawn => '\u{265F}',
    }
}

pub fn piece_color(side: Side) -> Color {
    match side {
        Side::White => WHITE_PIECE,
        Side::Black => BLACK_PIECE,
    }
}
