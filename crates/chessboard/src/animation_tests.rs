use super::*;
use crate::engine::{RulesEngine, ShakmatyEngine};
use crate::geometry::Visibility;
use crate::types::{PieceKind, Side};

fn sq(name: &str) -> Square {
    Square::parse(name).unwrap()
}

fn layout() -> BoardLayout {
    BoardLayout::new(40, Visibility::new(false, false), false)
}

fn setup(fen: &str, san: &str) -> (BoardSnapshot, MoveDescriptor, BoardSnapshot) {
    let engine = ShakmatyEngine::new();
    let before = engine.parse_position(fen).unwrap();
    let mv = engine.parse_move(&before, san).unwrap();
    let after = engine.apply_move(&before, &mv).unwrap();
    (
        engine.pieces(&before).into_iter().collect(),
        mv,
        engine.pieces(&after).into_iter().collect(),
    )
}

fn placed(pieces: impl IntoIterator<Item = FramePiece>) -> Vec<(String, i64, i64)> {
    let mut out: Vec<_> = pieces
        .into_iter()
        .map(|p| (p.piece.code(), p.origin.x.round() as i64, p.origin.y.round() as i64))
        .collect();
    out.sort();
    out
}

fn snapshot_placed(snapshot: &BoardSnapshot) -> Vec<(String, i64, i64)> {
    let layout = layout();
    placed(snapshot.iter().map(|(&square, &piece)| FramePiece {
        piece,
        origin: layout.square_origin(square),
    }))
}

const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[test]
fn test_normal_move_is_one_slide() {
    let (before, mv, _) = setup(START, "Nf3");
    assert_eq!(
        compute_deltas(&before, &mv),
        vec![PieceDelta::Slide {
            piece: Piece::new(Side::White, PieceKind::Knight),
            from: sq("g1"),
            to: sq("f3")
        }]
    );
}

#[test]
fn test_capture_adds_disappearance() {
    let (before, mv, _) = setup("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1", "exd5");
    let deltas = compute_deltas(&before, &mv);
    assert_eq!(deltas.len(), 2);
    assert!(deltas.contains(&PieceDelta::Disappear {
        piece: Piece::new(Side::Black, PieceKind::Pawn),
        square: sq("d5")
    }));
}

#[test]
fn test_castling_slides_king_and_rook() {
    let (before, mv, _) = setup("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", "O-O-O");
    assert_eq!(
        compute_deltas(&before, &mv),
        vec![
            PieceDelta::Slide {
                piece: Piece::new(Side::White, PieceKind::King),
                from: sq("e1"),
                to: sq("c1")
            },
            PieceDelta::Slide {
                piece: Piece::new(Side::White, PieceKind::Rook),
                from: sq("a1"),
                to: sq("d1")
            },
        ]
    );
}

#[test]
fn test_en_passant_removes_pawn_from_its_own_square() {
    let (before, mv, _) = setup("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2", "exd6");
    let deltas = compute_deltas(&before, &mv);
    assert!(deltas.contains(&PieceDelta::Disappear {
        piece: Piece::new(Side::Black, PieceKind::Pawn),
        square: sq("d5")
    }));
}

#[test]
fn test_promotion_slides_then_replaces() {
    let (before, mv, after) = setup("1r2k3/P7/8/8/8/8/8/4K3 w - - 0 1", "axb8=N");
    let deltas = compute_deltas(&before, &mv);
    assert_eq!(
        deltas,
        vec![
            PieceDelta::Slide {
                piece: Piece::new(Side::White, PieceKind::Pawn),
                from: sq("a7"),
                to: sq("b8")
            },
            PieceDelta::Disappear {
                piece: Piece::new(Side::Black, PieceKind::Rook),
                square: sq("b8")
            },
            PieceDelta::Appear {
                piece: Piece::new(Side::White, PieceKind::Knight),
                square: sq("b8")
            },
        ]
    );

    let animation = MoveAnimation::new(before, &mv, Instant::now());
    let layout = layout();
    let midway = placed(animation.frame(0.5, &layout));
    // pawn halfway between a7 (0, 40) and b8 (40, 0), rook still shown, no knight yet
    assert!(midway.contains(&("wp".to_string(), 20, 20)));
    assert!(midway.contains(&("br".to_string(), 40, 0)));
    assert!(!midway.iter().any(|(code, _, _)| code == "wn"));

    assert_eq!(placed(animation.frame(1.0, &layout)), snapshot_placed(&after));
}

#[test]
fn test_frame_endpoints() {
    for (fen, san) in [
        (START, "e4"),
        ("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", "O-O"),
        ("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2", "exd6"),
        ("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1", "exd5"),
    ] {
        let (before, mv, after) = setup(fen, san);
        let animation = MoveAnimation::new(before.clone(), &mv, Instant::now());
        let layout = layout();
        assert_eq!(placed(animation.frame(0.0, &layout)), snapshot_placed(&before), "{san}");
        assert_eq!(placed(animation.frame(1.0, &layout)), snapshot_placed(&after), "{san}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_progress_is_monotone_and_clamped() {
    let (before, mv, _) = setup(START, "e4");
    let started = Instant::now();
    let animation = MoveAnimation::new(before, &mv, started);

    let mut last = animation.progress(started);
    assert_eq!(last, 0.0);
    for _ in 0..10 {
        tokio::time::advance(Duration::from_millis(25)).await;
        let t = animation.progress(Instant::now());
        assert!(t >= last);
        last = t;
    }
    assert_eq!(last, 1.0);
    assert!(animation.is_finished(Instant::now()));
    assert_eq!(animation.progress(started + Duration::from_millis(100)), 0.5);
}

#[test]
fn test_frozen_motion() {
    let (before, mv, _) = setup(START, "e4");
    let started = Instant::now();
    let animation = MoveAnimation::new(before, &mv, started).with_hooks(DebugHooks::default().freeze_motion(0.25));
    assert_eq!(animation.progress(started + Duration::from_secs(5)), 0.25);
    assert!(!animation.is_finished(started + Duration::from_secs(5)));

    let frame = placed(animation.frame(animation.progress(started), &layout()));
    // e2 (160, 240) to e4 (160, 160), a quarter of the way
    assert!(frame.contains(&("wp".to_string(), 160, 220)));
}
