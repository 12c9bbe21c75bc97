//! Canvas drawing the render model of the board and feeding pointer events back

use chessboard::render::{Primitive, RenderModel};
use chessboard::{FramePiece, Piece, PromotionChoice, RulesEngine, ShakmatyEngine, Side, Square};
use iced::alignment;
use iced::mouse;
use iced::widget::canvas::{self, event, Frame, Geometry, Path, Stroke, Text};
use iced::{Color, Pixels, Rectangle, Renderer, Size, Theme};

use crate::styles;

pub type Position = <ShakmatyEngine as RulesEngine>::Position;

/// Pointer input in board pixel coordinates.
#[derive(Debug, Clone, Copy)]
pub enum PointerMessage {
    Down(chessboard::Point),
    Move(chessboard::Point),
    Up(chessboard::Point),
    Cancel,
}

/// One frame of the board: the render model plus transient interaction state.
pub struct BoardCanvas<'a> {
    pub model: &'a RenderModel<Position>,
    /// Pieces to draw instead of the static ones while a move animates.
    pub animation: Option<Vec<FramePiece>>,
    pub dragged: Option<(Piece, chessboard::Point)>,
    pub drag_origin: Option<Square>,
    pub selected: Option<Square>,
    pub promotion: Option<&'a PromotionChoice>,
}

fn point(p: chessboard::Point) -> iced::Point {
    iced::Point::new(p.x as f32, p.y as f32)
}

impl canvas::Program<PointerMessage> for BoardCanvas<'_> {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (event::Status, Option<PointerMessage>) {
        let canvas::Event::Mouse(mouse_event) = event else {
            return (event::Status::Ignored, None);
        };
        if let mouse::Event::CursorLeft = mouse_event {
            return (event::Status::Captured, Some(PointerMessage::Cancel));
        }
        let Some(position) = cursor.position_in(bounds) else {
            return (event::Status::Ignored, None);
        };
        let at = chessboard::Point::new(f64::from(position.x), f64::from(position.y));
        let message = match mouse_event {
            mouse::Event::ButtonPressed(mouse::Button::Left) => PointerMessage::Down(at),
            mouse::Event::ButtonReleased(mouse::Button::Left) => PointerMessage::Up(at),
            mouse::Event::CursorMoved { .. } => PointerMessage::Move(at),
            _ => return (event::Status::Ignored, None),
        };
        (event::Status::Captured, Some(message))
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let colors = self.model.colorset;
        let square = self.model.layout.square_size as f32;

        for primitive in &self.model.primitives {
            match primitive {
                Primitive::Square { origin, size, light, .. } => {
                    let color = if *light { colors.light } else { colors.dark };
                    frame.fill_rectangle(point(*origin), Size::new(*size as f32, *size as f32), styles::rgb(color));
                }
                Primitive::SquareMarker { origin, size, color, .. } => {
                    let color = styles::with_alpha(styles::rgb(colors.annotation(*color)), styles::SQUARE_MARKER_OPACITY);
                    frame.fill_rectangle(point(*origin), Size::new(*size as f32, *size as f32), color);
                }
                Primitive::Piece { piece, square: at, origin, size } => {
                    if self.animation.is_some() || self.drag_origin == Some(*at) {
                        continue;
                    }
                    draw_piece(&mut frame, *piece, point(*origin), *size as f32);
                }
                Primitive::TextMarker { center, size, symbol, color, .. } => {
                    frame.fill_text(Text {
                        content: symbol.glyph(),
                        position: point(*center),
                        color: styles::rgb(colors.annotation(*color)),
                        size: Pixels(*size as f32 * 0.6),
                        horizontal_alignment: alignment::Horizontal::Center,
                        vertical_alignment: alignment::Vertical::Center,
                        ..Text::default()
                    });
                }
                Primitive::Arrow { from, to, color, .. } => {
                    let color = styles::with_alpha(styles::rgb(colors.annotation(*color)), styles::ARROW_OPACITY);
                    draw_arrow(&mut frame, point(*from), point(*to), square, color);
                }
                Primitive::RankLabel { text, anchor, font_size, .. }
                | Primitive::FileLabel { text, anchor, font_size, .. } => {
                    frame.fill_text(Text {
                        content: text.to_string(),
                        position: point(*anchor),
                        color: styles::LABEL,
                        size: Pixels(*font_size as f32),
                        horizontal_alignment: alignment::Horizontal::Center,
                        vertical_alignment: alignment::Vertical::Center,
                        ..Text::default()
                    });
                }
                Primitive::TurnFlag { side, origin, size } => {
                    let flag = Path::rectangle(point(*origin), Size::new(*size as f32, *size as f32));
                    frame.fill(&flag, styles::piece_color(*side));
                    frame.stroke(&flag, Stroke::default().with_color(styles::PIECE_OUTLINE).with_width(1.0));
                }
            }
        }

        if let Some(selected) = self.selected {
            let origin = self.model.layout.square_origin(selected);
            frame.fill_rectangle(point(origin), Size::new(square, square), styles::SELECTED_SQUARE);
        }

        if let Some(pieces) = &self.animation {
            for piece in pieces {
                draw_piece(&mut frame, piece.piece, point(piece.origin), square);
            }
        }

        if let Some((piece, at)) = self.dragged {
            let origin = iced::Point::new(at.x as f32 - square / 2.0, at.y as f32 - square / 2.0);
            draw_piece(&mut frame, piece, origin, square);
        }

        if let Some(promotion) = self.promotion {
            for candidate in &promotion.candidates {
                let origin = point(self.model.layout.square_origin(candidate.square));
                frame.fill_rectangle(origin, Size::new(square, square), styles::PROMOTION_BACKGROUND);
                draw_piece(&mut frame, Piece::new(promotion.side, candidate.kind), origin, square);
            }
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(&self, _state: &Self::State, bounds: Rectangle, cursor: mouse::Cursor) -> mouse::Interaction {
        if self.dragged.is_some() {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::default()
        }
    }
}

fn draw_piece(frame: &mut Frame, piece: Piece, origin: iced::Point, size: f32) {
    let center = iced::Point::new(origin.x + size / 2.0, origin.y + size / 2.0);
    let glyph = styles::piece_glyph(piece.kind).to_string();
    // outline first so white pieces stay visible on light squares
    if piece.side == Side::White {
        for (dx, dy) in [(-1.0, 0.0), (1.0, 0.0), (0.0, -1.0), (0.0, 1.0)] {
            frame.fill_text(Text {
                content: glyph.clone(),
                position: iced::Point::new(center.x + dx, center.y + dy),
                color: styles::PIECE_OUTLINE,
                size: Pixels(size * 0.8),
                horizontal_alignment: alignment::Horizontal::Center,
                vertical_alignment: alignment::Vertical::Center,
                ..Text::default()
            });
        }
    }
    frame.fill_text(Text {
        content: glyph,
        position: center,
        color: styles::piece_color(piece.side),
        size: Pixels(size * 0.8),
        horizontal_alignment: alignment::Horizontal::Center,
        vertical_alignment: alignment::Vertical::Center,
        ..Text::default()
    });
}

fn draw_arrow(frame: &mut Frame, from: iced::Point, to: iced::Point, square: f32, color: Color) {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let length = (dx * dx + dy * dy).sqrt();
    if length < f32::EPSILON {
        return;
    }
    let (ux, uy) = (dx / length, dy / length);
    let head = square * 0.4;
    let base = iced::Point::new(to.x - ux * head, to.y - uy * head);

    let shaft = Path::line(from, base);
    frame.stroke(&shaft, Stroke::default().with_color(color).with_width(square * 0.15));

    let half = head * 0.55;
    let head_path = Path::new(|builder| {
        builder.move_to(to);
        builder.line_to(iced::Point::new(base.x - uy * half, base.y + ux * half));
        builder.line_to(iced::Point::new(base.x + uy * half, base.y - ux * half));
        builder.close();
    });
    frame.fill(&head_path, color);
}
