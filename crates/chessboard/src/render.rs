//! Render model: what to draw for one board, independent of any toolkit.
//!
//! [`render`] resolves the position (and optional move) through the rules
//! engine, lays the board out with [`BoardLayout`] and emits a flat list of
//! [`Primitive`]s in drawing order. Notation failures never escape as errors;
//! they become an [`ErrorBox`] to be drawn in place of the board.

use tracing::debug;

use crate::engine::{MoveDescriptor, RulesEngine};
use crate::error::NotationError;
use crate::geometry::{BoardLayout, BoardSize, Visibility};
use crate::markers::{AnnotationColor, AnnotationSymbol, Markers};
use crate::theme::{self, Colorset};
use crate::types::{Piece, Point, Side, Square, Vector};

/// Where the displayed position comes from.
#[derive(Debug, Clone)]
pub enum PositionSource<'a, P> {
    Fen(&'a str),
    Parsed(&'a P),
}

#[derive(Debug, Clone)]
pub struct RenderRequest<'a, P> {
    pub position: PositionSource<'a, P>,
    /// Move played from `position`; the board then shows the position after it.
    pub move_notation: Option<&'a str>,
    pub square_size: u32,
    pub visibility: Visibility,
    pub flipped: bool,
    pub move_arrow_visible: bool,
    pub move_arrow_color: AnnotationColor,
    pub markers: &'a Markers,
    pub colorset: &'a str,
    pub pieceset: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Square {
        square: Square,
        origin: Point,
        size: f64,
        light: bool,
    },
    Piece {
        piece: Piece,
        square: Square,
        origin: Point,
        size: f64,
    },
    SquareMarker {
        square: Square,
        origin: Point,
        size: f64,
        color: AnnotationColor,
    },
    TextMarker {
        square: Square,
        center: Point,
        size: f64,
        symbol: AnnotationSymbol,
        color: AnnotationColor,
    },
    Arrow {
        vector: Vector,
        from: Point,
        to: Point,
        color: AnnotationColor,
    },
    RankLabel {
        rank: u8,
        text: char,
        anchor: Point,
        font_size: f64,
    },
    FileLabel {
        file: u8,
        text: char,
        anchor: Point,
        font_size: f64,
    },
    TurnFlag {
        side: Side,
        origin: Point,
        size: f64,
    },
}

#[derive(Debug, Clone)]
pub struct RenderModel<P> {
    pub layout: BoardLayout,
    pub size: BoardSize,
    pub colorset: &'static Colorset,
    pub pieceset: &'static str,
    /// Displayed position (after the move, if one was supplied).
    pub position: P,
    /// Position the move was played from.
    pub position_before: Option<P>,
    pub played_move: Option<MoveDescriptor>,
    pub turn: Side,
    pub primitives: Vec<Primitive>,
}

impl<P> RenderModel<P> {
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Piece { square, piece, .. } => Some((*square, *piece)),
            _ => None,
        })
    }
}

/// Error descriptor drawn instead of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBox {
    pub title: String,
    pub message: String,
    pub line: Option<usize>,
    /// The offending text (or the part of its line around the failure).
    pub excerpt: Option<String>,
    /// Character offset of the failure within `excerpt`.
    pub caret: Option<usize>,
}

const EXCERPT_RADIUS: usize = 30;

impl ErrorBox {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            line: None,
            excerpt: None,
            caret: None,
        }
    }

    /// Error box for a notation failure in `text`.
    pub fn from_notation(title: impl Into<String>, error: &NotationError, text: &str) -> Self {
        let mut error_box = ErrorBox::new(title, error.message.clone());
        error_box.line = error.line;
        let Some(index) = error.index else {
            error_box.excerpt = Some(text.to_string());
            return error_box;
        };

        let chars: Vec<char> = text.chars().collect();
        let index = index.min(chars.len());
        let line_start = chars[..index].iter().rposition(|&c| c == '\n').map_or(0, |i| i + 1);
        let line_end = chars[index..]
            .iter()
            .position(|&c| c == '\n')
            .map_or(chars.len(), |i| index + i);
        let start = line_start.max(index.saturating_sub(EXCERPT_RADIUS));
        let end = line_end.min(index + EXCERPT_RADIUS);
        let mut excerpt: String = chars[start..end].iter().collect();
        let mut caret = index - start;
        if start > line_start {
            excerpt.insert_str(0, "...");
            caret += 3;
        }
        if end < line_end {
            excerpt.push_str("...");
        }
        error_box.excerpt = Some(excerpt);
        error_box.caret = Some(caret);
        error_box
    }
}

#[derive(Debug, Clone)]
pub enum RenderOutcome<P> {
    Board(RenderModel<P>),
    Error(ErrorBox),
}

impl<P> RenderOutcome<P> {
    pub fn board(&self) -> Option<&RenderModel<P>> {
        match self {
            RenderOutcome::Board(model) => Some(model),
            RenderOutcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorBox> {
        match self {
            RenderOutcome::Error(error_box) => Some(error_box),
            RenderOutcome::Board(_) => None,
        }
    }
}

pub fn render<E: RulesEngine>(engine: &E, request: &RenderRequest<'_, E::Position>) -> RenderOutcome<E::Position> {
    let initial = match request.position {
        PositionSource::Parsed(position) => position.clone(),
        PositionSource::Fen(fen) => match engine.parse_position(fen) {
            Ok(position) => position,
            Err(err) => {
                debug!(%err, "unrenderable position");
                return RenderOutcome::Error(ErrorBox::from_notation("Invalid FEN string", &err, fen));
            }
        },
    };

    let (position, position_before, played_move) = match request.move_notation {
        None => (initial, None, None),
        Some(notation) => {
            let played = engine
                .parse_move(&initial, notation)
                .and_then(|mv| engine.apply_move(&initial, &mv).map(|after| (mv, after)));
            match played {
                Ok((mv, after)) => (after, Some(initial), Some(mv)),
                Err(err) => {
                    debug!(%err, notation, "unrenderable move");
                    return RenderOutcome::Error(ErrorBox::from_notation("Invalid move notation", &err, notation));
                }
            }
        }
    };

    let layout = BoardLayout::new(request.square_size, request.visibility, request.flipped);
    let turn = engine.turn(&position);
    let pieces = engine.pieces(&position);
    let primitives = primitives(&layout, &pieces, turn, request.markers, played_move.as_ref(), request);

    RenderOutcome::Board(RenderModel {
        layout,
        size: layout.size(),
        colorset: theme::colorset_named(request.colorset),
        pieceset: theme::pieceset_named(request.pieceset),
        position,
        position_before,
        played_move,
        turn,
        primitives,
    })
}

fn primitives<P>(
    layout: &BoardLayout,
    pieces: &[(Square, Piece)],
    turn: Side,
    markers: &Markers,
    played_move: Option<&MoveDescriptor>,
    request: &RenderRequest<'_, P>,
) -> Vec<Primitive> {
    let size = f64::from(layout.square_size);
    let mut out = Vec::with_capacity(64 + pieces.len() + 17);

    for square in Square::all() {
        out.push(Primitive::Square {
            square,
            origin: layout.square_origin(square),
            size,
            light: square.is_light(),
        });
    }
    for (&square, &color) in &markers.squares {
        out.push(Primitive::SquareMarker {
            square,
            origin: layout.square_origin(square),
            size,
            color,
        });
    }
    for &(square, piece) in pieces {
        out.push(Primitive::Piece {
            piece,
            square,
            origin: layout.square_origin(square),
            size,
        });
    }
    for (&square, marker) in &markers.texts {
        out.push(Primitive::TextMarker {
            square,
            center: layout.square_center(square),
            size,
            symbol: marker.symbol,
            color: marker.color,
        });
    }
    for (&vector, &color) in &markers.arrows {
        out.push(arrow(layout, vector, color));
    }
    if let Some(mv) = played_move
        && request.move_arrow_visible
    {
        out.push(arrow(layout, Vector::new(mv.from, mv.to), request.move_arrow_color));
    }

    if layout.visibility.coordinate_visible {
        for i in 0..8u8 {
            out.push(Primitive::RankLabel {
                rank: i,
                text: (b'1' + i) as char,
                anchor: layout.rank_label_anchor(i),
                font_size: layout.font_size,
            });
        }
        for i in 0..8u8 {
            out.push(Primitive::FileLabel {
                file: i,
                text: (b'a' + i) as char,
                anchor: layout.file_label_anchor(i),
                font_size: layout.font_size,
            });
        }
    }
    if let Some(origin) = layout.turn_flag_origin(turn) {
        out.push(Primitive::TurnFlag {
            side: turn,
            origin,
            size,
        });
    }
    out
}

fn arrow(layout: &BoardLayout, vector: Vector, color: AnnotationColor) -> Primitive {
    Primitive::Arrow {
        vector,
        from: layout.square_center(vector.from),
        to: layout.square_center(vector.to),
        color,
    }
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod render_tests;
