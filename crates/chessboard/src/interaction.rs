//! Pointer interaction over the board.
//!
//! [`InteractionMachine`] turns press/move/release sequences into semantic
//! [`BoardEvent`]s. Each [`InteractionMode`] maps to one [`GestureRule`], a pure
//! function of the press square, the release square, whether the pointer was
//! dragged, and a read-only [`BoardQuery`]. Gestures a rule rejects are dropped
//! without an event.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::engine::{MoveDescriptor, RulesEngine};
use crate::geometry::BoardLayout;
use crate::markers::AnnotationColor;
use crate::types::{Piece, PieceKind, Point, Side, Square, Vector};

/// Distance in pixels the pointer must travel before a press becomes a drag.
pub const DRAG_THRESHOLD: f64 = 3.0;

const PROMOTION_ORDER: [PieceKind; 4] = [PieceKind::Queen, PieceKind::Rook, PieceKind::Bishop, PieceKind::Knight];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InteractionMode {
    #[default]
    None,
    MovePieces,
    ClickSquares,
    EditArrows,
    PlayMoves,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoardEvent {
    SquareClicked(Square),
    PieceMoved { from: Square, to: Square },
    ArrowEdited { vector: Vector, color: AnnotationColor },
    /// SAN of the move, as formatted by the rules engine.
    MovePlayed(String),
}

/// Read-only view of the displayed position.
pub trait BoardQuery {
    fn piece_at(&self, square: Square) -> Option<Piece>;

    fn turn(&self) -> Side;

    /// Legal moves from `from` to `to` with their SAN.
    fn moves_between(&self, from: Square, to: Square) -> Vec<(MoveDescriptor, String)>;
}

/// [`BoardQuery`] over a rules engine and one of its positions.
pub struct EngineQuery<'a, E: RulesEngine> {
    engine: &'a E,
    position: &'a E::Position,
}

impl<'a, E: RulesEngine> EngineQuery<'a, E> {
    pub fn new(engine: &'a E, position: &'a E::Position) -> Self {
        Self { engine, position }
    }
}

impl<E: RulesEngine> BoardQuery for EngineQuery<'_, E> {
    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.engine.piece_at(self.position, square)
    }

    fn turn(&self) -> Side {
        self.engine.turn(self.position)
    }

    fn moves_between(&self, from: Square, to: Square) -> Vec<(MoveDescriptor, String)> {
        self.engine
            .moves_between(self.position, from, to)
            .into_iter()
            .map(|mv| {
                let san = self.engine.format_move(self.position, &mv);
                (mv, san)
            })
            .collect()
    }
}

/// A press in progress.
#[derive(Clone, Debug, PartialEq)]
pub struct DragState {
    pub origin: Square,
    pub origin_point: Point,
    pub current_point: Point,
    pub piece: Option<Piece>,
    /// Piece selected by an earlier click, in `PlayMoves`.
    pub selection: Option<Square>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromotionCandidate {
    pub kind: PieceKind,
    /// Square of the picker entry for this piece.
    pub square: Square,
    pub notation: String,
}

/// Pending promotion: the move is known up to the promoted piece.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromotionChoice {
    pub from: Square,
    pub to: Square,
    pub side: Side,
    pub candidates: Vec<PromotionCandidate>,
}

impl PromotionChoice {
    fn new(from: Square, to: Square, side: Side, moves: Vec<(MoveDescriptor, String)>) -> Self {
        let step: i8 = if to.rank() >= 4 { -1 } else { 1 };
        let candidates = PROMOTION_ORDER
            .iter()
            .filter_map(|&kind| moves.iter().find(|(mv, _)| mv.promotion == Some(kind)).map(|(_, san)| (kind, san)))
            .enumerate()
            .filter_map(|(i, (kind, san))| {
                let square = to.offset(0, step * i as i8)?;
                Some(PromotionCandidate {
                    kind,
                    square,
                    notation: san.clone(),
                })
            })
            .collect();
        Self {
            from,
            to,
            side,
            candidates,
        }
    }

    pub fn candidate_at(&self, square: Square) -> Option<&PromotionCandidate> {
        self.candidates.iter().find(|c| c.square == square)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    Pressed(DragState),
    Dragging(DragState),
    Selected(Square),
    Promotion(PromotionChoice),
}

/// A completed press/release pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gesture {
    pub from: Square,
    pub to: Option<Square>,
    pub dragged: bool,
    pub selection: Option<Square>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Event(BoardEvent),
    Select(Square),
    Promote(PromotionChoice),
    Reject(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureRule {
    ClickSquare,
    MovePiece,
    EditArrow { color: AnnotationColor },
    PlayMove,
}

impl GestureRule {
    pub fn for_mode(mode: InteractionMode, arrow_color: AnnotationColor) -> Option<GestureRule> {
        match mode {
            InteractionMode::None => None,
            InteractionMode::ClickSquares => Some(GestureRule::ClickSquare),
            InteractionMode::MovePieces => Some(GestureRule::MovePiece),
            InteractionMode::EditArrows => Some(GestureRule::EditArrow { color: arrow_color }),
            InteractionMode::PlayMoves => Some(GestureRule::PlayMove),
        }
    }

    /// Whether a press on `square` may start a gesture.
    pub fn accepts_press(self, square: Square, selection: Option<Square>, query: &impl BoardQuery) -> bool {
        match self {
            GestureRule::ClickSquare | GestureRule::EditArrow { .. } => true,
            GestureRule::MovePiece => query.piece_at(square).is_some(),
            GestureRule::PlayMove => {
                let own = query.piece_at(square).is_some_and(|p| p.side == query.turn());
                own || selection.is_some_and(|from| !query.moves_between(from, square).is_empty())
            }
        }
    }

    pub fn resolve(self, gesture: &Gesture, query: &impl BoardQuery) -> Resolution {
        let Some(to) = gesture.to else {
            return Resolution::Reject("released off-board");
        };
        let from = gesture.from;
        match self {
            GestureRule::ClickSquare => {
                if from == to {
                    Resolution::Event(BoardEvent::SquareClicked(from))
                } else {
                    Resolution::Reject("released on another square")
                }
            }
            GestureRule::MovePiece => {
                if from == to {
                    Resolution::Reject("released on the origin square")
                } else if query.piece_at(from).is_none() {
                    Resolution::Reject("no piece on the origin square")
                } else {
                    Resolution::Event(BoardEvent::PieceMoved { from, to })
                }
            }
            GestureRule::EditArrow { color } => {
                if from == to {
                    Resolution::Reject("degenerate arrow")
                } else {
                    Resolution::Event(BoardEvent::ArrowEdited {
                        vector: Vector::new(from, to),
                        color,
                    })
                }
            }
            GestureRule::PlayMove => {
                // Second click of click-to-move.
                if let Some(selected) = gesture.selection
                    && !gesture.dragged
                    && from == to
                    && selected != to
                    && query.piece_at(to).is_none_or(|p| p.side != query.turn())
                {
                    return play(selected, to, query);
                }
                if from == to {
                    if gesture.dragged || gesture.selection == Some(from) {
                        return Resolution::Reject("released on the origin square");
                    }
                    return Resolution::Select(from);
                }
                play(from, to, query)
            }
        }
    }
}

fn play(from: Square, to: Square, query: &impl BoardQuery) -> Resolution {
    let moves = query.moves_between(from, to);
    match moves.len() {
        0 => Resolution::Reject("illegal move"),
        1 => Resolution::Event(BoardEvent::MovePlayed(moves[0].1.clone())),
        _ => Resolution::Promote(PromotionChoice::new(from, to, query.turn(), moves)),
    }
}

/// Pointer state machine of one board.
#[derive(Clone, Debug)]
pub struct InteractionMachine {
    mode: InteractionMode,
    arrow_color: AnnotationColor,
    state: InteractionState,
}

impl Default for InteractionMachine {
    fn default() -> Self {
        Self::new(InteractionMode::None, AnnotationColor::Green)
    }
}

impl InteractionMachine {
    pub fn new(mode: InteractionMode, arrow_color: AnnotationColor) -> Self {
        Self {
            mode,
            arrow_color,
            state: InteractionState::Idle,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Changing the mode drops any gesture in progress.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        if mode != self.mode {
            self.mode = mode;
            self.state = InteractionState::Idle;
        }
    }

    pub fn set_arrow_color(&mut self, color: AnnotationColor) {
        self.arrow_color = color;
    }

    fn rule(&self) -> Option<GestureRule> {
        GestureRule::for_mode(self.mode, self.arrow_color)
    }

    pub fn pointer_down(&mut self, point: Point, layout: &BoardLayout, query: &impl BoardQuery) -> Option<BoardEvent> {
        let previous = std::mem::take(&mut self.state);
        let rule = self.rule()?;
        let square = layout.square_at(point);

        let selection = match previous {
            InteractionState::Promotion(choice) => {
                // A press either picks a candidate or abandons the promotion.
                if let Some(candidate) = square.and_then(|s| choice.candidate_at(s)) {
                    return Some(BoardEvent::MovePlayed(candidate.notation.clone()));
                }
                trace!("promotion abandoned");
                return None;
            }
            InteractionState::Selected(selected) => Some(selected),
            InteractionState::Pressed(_) | InteractionState::Dragging(_) => {
                trace!("incomplete gesture discarded");
                None
            }
            InteractionState::Idle => None,
        };

        let Some(square) = square else {
            trace!(?point, "press off-board");
            return None;
        };
        if !rule.accepts_press(square, selection, query) {
            trace!(%square, ?rule, "press ignored");
            return None;
        }
        self.state = InteractionState::Pressed(DragState {
            origin: square,
            origin_point: point,
            current_point: point,
            piece: query.piece_at(square),
            selection,
        });
        None
    }

    pub fn pointer_move(&mut self, point: Point) {
        self.state = match std::mem::take(&mut self.state) {
            InteractionState::Pressed(mut drag) => {
                drag.current_point = point;
                if drag.origin_point.distance(point) > DRAG_THRESHOLD {
                    InteractionState::Dragging(drag)
                } else {
                    InteractionState::Pressed(drag)
                }
            }
            InteractionState::Dragging(mut drag) => {
                drag.current_point = point;
                InteractionState::Dragging(drag)
            }
            other => other,
        };
    }

    pub fn pointer_up(&mut self, point: Point, layout: &BoardLayout, query: &impl BoardQuery) -> Option<BoardEvent> {
        let (drag, dragged) = match std::mem::take(&mut self.state) {
            InteractionState::Pressed(drag) => (drag, false),
            InteractionState::Dragging(drag) => (drag, true),
            other => {
                self.state = other;
                return None;
            }
        };
        let rule = self.rule()?;
        let gesture = Gesture {
            from: drag.origin,
            to: layout.square_at(point),
            dragged,
            selection: drag.selection,
        };
        match rule.resolve(&gesture, query) {
            Resolution::Event(event) => Some(event),
            Resolution::Select(square) => {
                self.state = InteractionState::Selected(square);
                None
            }
            Resolution::Promote(choice) => {
                self.state = InteractionState::Promotion(choice);
                None
            }
            Resolution::Reject(reason) => {
                trace!(?gesture, reason, "gesture rejected");
                None
            }
        }
    }

    /// Pointer-cancel or Escape.
    pub fn cancel(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Piece following the pointer, with the pointer position.
    pub fn dragged_piece(&self) -> Option<(Piece, Point)> {
        match &self.state {
            InteractionState::Dragging(drag) => drag.piece.map(|piece| (piece, drag.current_point)),
            _ => None,
        }
    }

    pub fn drag_origin(&self) -> Option<Square> {
        match &self.state {
            InteractionState::Dragging(drag) => Some(drag.origin),
            _ => None,
        }
    }

    pub fn selected_square(&self) -> Option<Square> {
        match &self.state {
            InteractionState::Selected(square) => Some(*square),
            _ => None,
        }
    }

    pub fn promotion(&self) -> Option<&PromotionChoice> {
        match &self.state {
            InteractionState::Promotion(choice) => Some(choice),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "interaction_tests.rs"]
mod interaction_tests;
