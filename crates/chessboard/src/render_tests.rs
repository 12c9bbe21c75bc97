use super::*;
use crate::engine::{ShakmatyEngine, START_FEN};
use crate::markers::{parse_arrow_markers, parse_square_markers, parse_text_markers};

fn sq(name: &str) -> Square {
    Square::parse(name).unwrap()
}

fn request<'a>(fen: &'a str, markers: &'a Markers) -> RenderRequest<'a, shakmaty::Chess> {
    RenderRequest {
        position: PositionSource::Fen(fen),
        move_notation: None,
        square_size: 40,
        visibility: Visibility::new(true, true),
        flipped: false,
        move_arrow_visible: true,
        move_arrow_color: AnnotationColor::Blue,
        markers,
        colorset: "original",
        pieceset: "cburnett",
    }
}

fn count(model: &RenderModel<shakmaty::Chess>, pred: impl Fn(&Primitive) -> bool) -> usize {
    model.primitives.iter().filter(|p| pred(p)).count()
}

#[test]
fn test_start_position_primitives() {
    let markers = Markers::default();
    let outcome = render(&ShakmatyEngine::new(), &request(START_FEN, &markers));
    let model = outcome.board().expect("board");

    assert_eq!(model.size, BoardSize::new(374, 333));
    assert_eq!(count(model, |p| matches!(p, Primitive::Square { .. })), 64);
    assert_eq!(model.pieces().count(), 32);
    assert_eq!(count(model, |p| matches!(p, Primitive::RankLabel { .. })), 8);
    assert_eq!(count(model, |p| matches!(p, Primitive::FileLabel { .. })), 8);
    assert!(model.played_move.is_none());

    let flag = model
        .primitives
        .iter()
        .find_map(|p| match p {
            Primitive::TurnFlag { side, origin, .. } => Some((*side, *origin)),
            _ => None,
        })
        .expect("turn flag");
    assert_eq!(flag, (Side::White, Point::new(334.0, 280.0)));
}

#[test]
fn test_square_colors_alternate() {
    let markers = Markers::default();
    let outcome = render(&ShakmatyEngine::new(), &request(START_FEN, &markers));
    let model = outcome.board().unwrap();
    let light = |name: &str| {
        model.primitives.iter().find_map(|p| match p {
            Primitive::Square { square, light, .. } if *square == sq(name) => Some(*light),
            _ => None,
        })
    };
    assert_eq!(light("a1"), Some(false));
    assert_eq!(light("h1"), Some(true));
    assert_eq!(light("e4"), Some(true));
}

#[test]
fn test_flipped_board_places_a1_top_right() {
    let markers = Markers::default();
    let mut req = request(START_FEN, &markers);
    req.flipped = true;
    let outcome = render(&ShakmatyEngine::new(), &req);
    let model = outcome.board().unwrap();
    let a1 = model.primitives.iter().find_map(|p| match p {
        Primitive::Square { square, origin, .. } if *square == sq("a1") => Some(*origin),
        _ => None,
    });
    assert_eq!(a1, Some(Point::new(290.0, 0.0)));
}

#[test]
fn test_hidden_decorations() {
    let markers = Markers::default();
    let mut req = request(START_FEN, &markers);
    req.visibility = Visibility::new(false, false);
    let outcome = render(&ShakmatyEngine::new(), &req);
    let model = outcome.board().unwrap();
    assert_eq!(model.size, BoardSize::new(320, 320));
    assert_eq!(
        count(model, |p| matches!(
            p,
            Primitive::RankLabel { .. } | Primitive::FileLabel { .. } | Primitive::TurnFlag { .. }
        )),
        0
    );
}

#[test]
fn test_markers_are_drawn() {
    let markers = Markers {
        squares: parse_square_markers("Ga1,Rh8"),
        texts: parse_text_markers("YAe4"),
        arrows: parse_arrow_markers("Bb1c3"),
    };
    let outcome = render(&ShakmatyEngine::new(), &request(START_FEN, &markers));
    let model = outcome.board().unwrap();
    assert_eq!(count(model, |p| matches!(p, Primitive::SquareMarker { .. })), 2);
    assert_eq!(count(model, |p| matches!(p, Primitive::TextMarker { .. })), 1);

    let arrow = model.primitives.iter().find_map(|p| match p {
        Primitive::Arrow { from, to, color, .. } => Some((*from, *to, *color)),
        _ => None,
    });
    // b1 centre (10 + 40 + 20, 280 + 20), c3 centre (10 + 80 + 20, 200 + 20)
    assert_eq!(
        arrow,
        Some((Point::new(70.0, 300.0), Point::new(110.0, 220.0), AnnotationColor::Blue))
    );
}

#[test]
fn test_move_shows_position_after_and_arrow() {
    let markers = Markers::default();
    let mut req = request(START_FEN, &markers);
    req.move_notation = Some("e4");
    req.move_arrow_color = AnnotationColor::Red;
    let outcome = render(&ShakmatyEngine::new(), &req);
    let model = outcome.board().unwrap();

    assert_eq!(model.turn, Side::Black);
    assert!(model.position_before.is_some());
    let mv = model.played_move.unwrap();
    assert_eq!((mv.from, mv.to), (sq("e2"), sq("e4")));
    assert!(model.pieces().any(|(s, _)| s == sq("e4")));
    assert!(!model.pieces().any(|(s, _)| s == sq("e2")));

    let arrows: Vec<_> = model
        .primitives
        .iter()
        .filter_map(|p| match p {
            Primitive::Arrow { vector, color, .. } => Some((*vector, *color)),
            _ => None,
        })
        .collect();
    assert_eq!(arrows, vec![(Vector::new(sq("e2"), sq("e4")), AnnotationColor::Red)]);
}

#[test]
fn test_move_arrow_can_be_hidden() {
    let markers = Markers::default();
    let mut req = request(START_FEN, &markers);
    req.move_notation = Some("Nf3");
    req.move_arrow_visible = false;
    let outcome = render(&ShakmatyEngine::new(), &req);
    let model = outcome.board().unwrap();
    assert_eq!(count(model, |p| matches!(p, Primitive::Arrow { .. })), 0);
}

#[test]
fn test_invalid_fen_yields_error_box() {
    let markers = Markers::default();
    let fen = "rnbqkbnr/ppxppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    let outcome = render(&ShakmatyEngine::new(), &request(fen, &markers));
    let error_box = outcome.error().expect("error box");
    assert_eq!(error_box.title, "Invalid FEN string");
    assert_eq!(error_box.caret, Some(11));
    let excerpt = error_box.excerpt.as_deref().unwrap();
    assert!(excerpt.starts_with("rnbqkbnr/ppx"));
    assert_eq!(excerpt.chars().nth(11), Some('x'));
}

#[test]
fn test_invalid_move_yields_error_box() {
    let markers = Markers::default();
    let mut req = request(START_FEN, &markers);
    req.move_notation = Some("Ke5");
    let outcome = render(&ShakmatyEngine::new(), &req);
    let error_box = outcome.error().expect("error box");
    assert_eq!(error_box.title, "Invalid move notation");
    assert_eq!(error_box.excerpt.as_deref(), Some("Ke5"));
}

#[test]
fn test_error_box_excerpt_is_clipped_around_caret() {
    let text = format!("{}X{}", "a".repeat(50), "b".repeat(50));
    let err = NotationError::new(crate::error::NotationErrorKind::InvalidPgn, "bad").at(50, 1);
    let error_box = ErrorBox::from_notation("Invalid PGN", &err, &text);
    let excerpt = error_box.excerpt.unwrap();
    let caret = error_box.caret.unwrap();
    assert!(excerpt.starts_with("..."));
    assert!(excerpt.ends_with("..."));
    assert_eq!(excerpt.chars().nth(caret), Some('X'));
}

#[test]
fn test_error_box_excerpt_uses_failing_line() {
    let text = "first line\nsecond Zline\nthird";
    let err = NotationError::new(crate::error::NotationErrorKind::InvalidPgn, "bad").at(18, 2);
    let error_box = ErrorBox::from_notation("Invalid PGN", &err, text);
    assert_eq!(error_box.excerpt.as_deref(), Some("second Zline"));
    assert_eq!(error_box.caret, Some(7));
    assert_eq!(error_box.line, Some(2));
}

#[test]
fn test_parsed_position_source() {
    let engine = ShakmatyEngine::new();
    let position = engine.start_position();
    let markers = Markers::default();
    let mut req = request("", &markers);
    req.position = PositionSource::Parsed(&position);
    let outcome = render(&engine, &req);
    assert_eq!(outcome.board().unwrap().pieces().count(), 32);
}
