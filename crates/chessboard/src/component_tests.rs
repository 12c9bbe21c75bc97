use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::animation::ANIMATION_DURATION;
use crate::engine::ShakmatyEngine;
use crate::error::SoundError;
use crate::geometry::{MAX_SQUARE_SIZE, SmallScreenLimit};
use crate::interaction::InteractionMode;
use crate::sound::MoveSound;

fn sq(name: &str) -> Square {
    Square::parse(name).unwrap()
}

fn center(board: &Chessboard<ShakmatyEngine>, name: &str) -> Point {
    board.layout().unwrap().square_center(sq(name))
}

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<MoveSound>>>);

impl SoundPlayer for Recorder {
    fn play(&mut self, sound: MoveSound) -> Result<(), SoundError> {
        self.0.borrow_mut().push(sound);
        Ok(())
    }
}

// =============================================================================
// Chessboard
// =============================================================================

#[test]
fn test_static_size() {
    assert_eq!(Chessboard::<ShakmatyEngine>::size(40, true, true).unwrap(), BoardSize::new(374, 333));
    assert_eq!(Chessboard::<ShakmatyEngine>::size(40, false, false).unwrap(), BoardSize::new(320, 320));
    let adapted = Chessboard::<ShakmatyEngine>::adapt_square_size(320.0, 320.0, &SizeOptions::new(false, false)).unwrap();
    assert_eq!(adapted.square_size, 40);
    assert!(Chessboard::<ShakmatyEngine>::adapt_square_size(-1.0, 320.0, &SizeOptions::default()).is_err());
}

#[test]
fn test_static_size_rejects_out_of_range_square_sizes() {
    for square_size in [0, 11, 97, u32::MAX / 4] {
        let err = Chessboard::<ShakmatyEngine>::size(square_size, true, true).unwrap_err();
        assert_eq!(err.parameter(), Some("squareSize"), "square size {square_size}");
    }
    assert!(Chessboard::<ShakmatyEngine>::size(12, true, true).is_ok());
    assert!(Chessboard::<ShakmatyEngine>::size(96, true, true).is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_out_of_range_options_are_clamped_or_rejected() {
    let now = Instant::now();
    let options = BoardOptions {
        square_size: u32::MAX / 4,
        ..BoardOptions::default()
    };
    let mut board = Chessboard::new(ShakmatyEngine::new(), options.clone());
    assert_eq!(board.options().square_size, MAX_SQUARE_SIZE);
    assert_eq!(
        board.outcome().board().unwrap().size,
        Chessboard::<ShakmatyEngine>::size(MAX_SQUARE_SIZE, true, true).unwrap()
    );

    let err = board.set_options(options, now).unwrap_err();
    assert_eq!(err.parameter(), Some("squareSize"));
    assert_eq!(board.options().square_size, MAX_SQUARE_SIZE);
}

#[test]
fn test_click_is_dispatched_to_callback() {
    let clicked = Rc::new(RefCell::new(Vec::new()));
    let sink = clicked.clone();
    let options = BoardOptions {
        interaction_mode: InteractionMode::ClickSquares,
        ..BoardOptions::default()
    };
    let mut board = Chessboard::new(ShakmatyEngine::new(), options).with_callbacks(BoardCallbacks {
        on_square_clicked: Some(Box::new(move |square| sink.borrow_mut().push(square))),
        ..BoardCallbacks::default()
    });

    let point = center(&board, "e4");
    let down = board.pointer_down(point);
    let up = board.pointer_up(point);
    assert_eq!(down.or(up), Some(BoardEvent::SquareClicked(sq("e4"))));
    assert_eq!(*clicked.borrow(), vec![sq("e4")]);
}

#[test]
fn test_played_move_reaches_callback() {
    let played = Rc::new(RefCell::new(Vec::new()));
    let sink = played.clone();
    let options = BoardOptions {
        interaction_mode: InteractionMode::PlayMoves,
        ..BoardOptions::default()
    };
    let mut board = Chessboard::new(ShakmatyEngine::new(), options).with_callbacks(BoardCallbacks {
        on_move_played: Some(Box::new(move |san| sink.borrow_mut().push(san.to_string()))),
        ..BoardCallbacks::default()
    });

    let (from, to) = (center(&board, "g1"), center(&board, "f3"));
    assert_eq!(board.pointer_down(from), None);
    board.pointer_move(from.lerp(to, 0.5));
    assert!(board.dragged_piece().is_some());
    assert_eq!(board.drag_origin(), Some(sq("g1")));
    board.pointer_move(to);
    assert_eq!(board.pointer_up(to), Some(BoardEvent::MovePlayed("Nf3".to_string())));
    assert_eq!(*played.borrow(), vec!["Nf3".to_string()]);
}

#[test]
fn test_invalid_position_renders_error_and_ignores_pointer() {
    let options = BoardOptions {
        position: "not a fen".to_string(),
        interaction_mode: InteractionMode::ClickSquares,
        ..BoardOptions::default()
    };
    let mut board = Chessboard::new(ShakmatyEngine::new(), options);
    assert_eq!(board.outcome().error().map(|e| e.title.as_str()), Some("Invalid FEN string"));
    assert_eq!(board.pointer_down(Point::new(30.0, 30.0)), None);
}

#[test]
fn test_viewport_applies_small_screen_limit() {
    let now = Instant::now();
    let options = BoardOptions {
        small_screen_limits: vec![SmallScreenLimit::new(500).with_square_size(24).with_turn_visible(false)],
        ..BoardOptions::default()
    };
    let mut board = Chessboard::new(ShakmatyEngine::new(), options);
    assert_eq!(board.outcome().board().unwrap().size, BoardSize::new(374, 333));

    board.set_viewport_width(Some(480), now);
    let size = Chessboard::<ShakmatyEngine>::size(24, true, false).unwrap();
    assert_eq!(board.outcome().board().unwrap().size, size);

    board.set_viewport_width(Some(800), now);
    assert_eq!(board.outcome().board().unwrap().size, BoardSize::new(374, 333));
}

#[tokio::test(start_paused = true)]
async fn test_changed_move_animates_and_plays_sound() {
    let now = Instant::now();
    let sounds = Recorder::default();
    let options = BoardOptions {
        animated: true,
        ..BoardOptions::default()
    };
    let mut board = Chessboard::new(ShakmatyEngine::new(), options.clone()).with_sound(Box::new(sounds.clone()), true);
    assert!(!board.is_animating(now));

    let with_move = BoardOptions {
        move_notation: Some("e4".to_string()),
        ..options
    };
    board.set_options(with_move.clone(), now).unwrap();
    assert!(board.is_animating(now));
    assert_eq!(*sounds.0.borrow(), vec![MoveSound::Move]);
    let frame = board.animation_frame(now).unwrap();
    assert_eq!(frame.len(), 32);

    // same move again: nothing new to animate
    board.set_options(with_move, now).unwrap();
    assert_eq!(sounds.0.borrow().len(), 1);

    tokio::time::advance(ANIMATION_DURATION).await;
    let later = Instant::now();
    assert!(!board.is_animating(later));
    assert!(board.animation_frame(later).is_none());
}

#[test]
fn test_unanimated_board_still_plays_sound() {
    let now = Instant::now();
    let sounds = Recorder::default();
    let mut board = Chessboard::new(ShakmatyEngine::new(), BoardOptions::default())
        .with_sound(Box::new(sounds.clone()), false)
        .with_hooks(DebugHooks::default().force_sound(true));
    let engine = ShakmatyEngine::new();
    let position = engine
        .parse_position("r3k3/8/8/8/8/8/8/4K3 b q - 0 1")
        .unwrap();
    board.show_position("before castling", position.clone(), None, now);
    board.show_position("castle", position, Some("O-O-O".to_string()), now);
    assert!(!board.is_animating(now));
    assert_eq!(*sounds.0.borrow(), vec![MoveSound::Castle]);
}

// =============================================================================
// NavigationBoard
// =============================================================================

const PGN: &str = "1. e4 e5 (1... c5) 2. Nf3 *";

fn game() -> Game<ShakmatyEngine> {
    Game::parse(ShakmatyEngine::new(), PGN).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_navigation_board_shows_move_nodes() {
    let now = Instant::now();
    let mut nav = NavigationBoard::new(
        game(),
        BoardOptions::default(),
        NavigationState::default(),
        NavigationCallbacks::default(),
        now,
    );
    assert_eq!(nav.node_id(), "start");
    assert!(nav.board().outcome().board().unwrap().played_move.is_none());

    nav.handle(NavAction::Next, now);
    let model = nav.board().outcome().board().unwrap();
    assert_eq!(model.played_move.map(|mv| mv.uci()).as_deref(), Some("e2e4"));

    nav.handle_key(NavKey::End, now);
    assert_eq!(nav.node_id(), "2w");
    nav.handle(NavAction::Flip, now);
    assert!(nav.is_flipped());
    assert!(nav.board().outcome().board().unwrap().layout.flipped);
}

#[tokio::test(start_paused = true)]
async fn test_navigation_board_delegated_node_id() {
    let now = Instant::now();
    let requested = Rc::new(RefCell::new(Vec::new()));
    let sink = requested.clone();
    let mut nav = NavigationBoard::new(
        game(),
        BoardOptions::default(),
        NavigationState {
            node_id: Some("1w".to_string()),
            ..NavigationState::default()
        },
        NavigationCallbacks {
            on_node_id_changed: Some(Box::new(move |id| sink.borrow_mut().push(id.to_string()))),
            ..NavigationCallbacks::default()
        },
        now,
    );

    nav.handle(NavAction::Next, now);
    assert_eq!(*requested.borrow(), vec!["1b".to_string()]);
    assert_eq!(nav.node_id(), "1w");

    nav.sync(
        NavigationState {
            node_id: Some("1b-v0-1b".to_string()),
            ..NavigationState::default()
        },
        now,
    );
    assert_eq!(nav.node_id(), "1b-v0-1b");
    let model = nav.board().outcome().board().unwrap();
    assert_eq!(model.played_move.map(|mv| mv.uci()).as_deref(), Some("c7c5"));
}

#[tokio::test(start_paused = true)]
async fn test_navigation_board_autoplay() {
    let start = Instant::now();
    let mut nav = NavigationBoard::new(
        game(),
        BoardOptions::default(),
        NavigationState::default(),
        NavigationCallbacks::default(),
        start,
    );
    nav.handle(NavAction::TogglePlay, start);
    assert!(nav.is_playing());
    let deadline = nav.timer().deadline().unwrap();

    assert!(nav.poll(start).is_empty());
    let events = nav.poll(deadline);
    assert_eq!(events, vec![NavigationEvent::NodeIdChanged("1w".to_string())]);
    assert_eq!(nav.node_id(), "1w");
}

#[tokio::test(start_paused = true)]
async fn test_play_move_extends_follows_or_branches() {
    let now = Instant::now();
    let mut nav = NavigationBoard::new(
        game(),
        BoardOptions::default(),
        NavigationState::default(),
        NavigationCallbacks::default(),
        now,
    );

    // same move as the main line: just follow it
    assert_eq!(nav.play_move("e4", now).unwrap(), "1w");
    assert_eq!(nav.game().move_node("1w").map(|n| n.variations.len()), Some(0));

    // different move: a new variation off 1...e5
    let branched = nav.play_move("d5", now).unwrap();
    assert_eq!(branched, "1b-v1-1b");
    assert_eq!(nav.node_id(), "1b-v1-1b");

    // end of the line: appended
    assert_eq!(nav.play_move("exd5", now).unwrap(), "1b-v1-2w");
    assert!(nav.play_move("Ke7", now).is_err());
    assert_eq!(nav.node_id(), "1b-v1-2w");

    assert!(nav.go_to("nowhere", now).is_empty());
    assert_eq!(nav.go_to("2w", now), vec![NavigationEvent::NodeIdChanged("2w".to_string())]);
}

#[test]
fn test_navigation_board_size_includes_toolbar() {
    let size = NavigationBoard::<ShakmatyEngine>::size(40, true, true).unwrap();
    assert_eq!(size, BoardSize::new(374, 333 + NAVIGATION_TOOLBAR_MIN_HEIGHT));
    let size = NavigationBoard::<ShakmatyEngine>::size(48, false, false).unwrap();
    assert_eq!(size, BoardSize::new(384, 384 + 36));
    assert!(NavigationBoard::<ShakmatyEngine>::size(97, true, true).is_err());

    // 45 * 8 + 33 fits in 400 pixels, 46 * 8 + 34 does not
    let options = SizeOptions::new(false, false);
    let adapted = NavigationBoard::<ShakmatyEngine>::adapt_square_size(400.0, 400.0, &options).unwrap();
    assert_eq!(adapted.square_size, 45);
    let bare = Chessboard::<ShakmatyEngine>::adapt_square_size(400.0, 400.0, &options).unwrap();
    assert_eq!(bare.square_size, 50);
}

#[tokio::test(start_paused = true)]
async fn test_only_forward_steps_animate() {
    let now = Instant::now();
    let options = BoardOptions {
        animated: true,
        ..BoardOptions::default()
    };
    let mut nav = NavigationBoard::new(
        game(),
        options,
        NavigationState::default(),
        NavigationCallbacks::default(),
        now,
    );
    nav.handle(NavAction::Next, now);
    assert!(nav.board().is_animating(now));

    nav.handle(NavAction::Last, now);
    assert_eq!(nav.node_id(), "2w");
    assert!(!nav.board().is_animating(now));

    nav.handle(NavAction::Previous, now);
    assert_eq!(nav.node_id(), "1b");
    assert!(!nav.board().is_animating(now));

    nav.handle(NavAction::Next, now);
    assert!(nav.board().is_animating(now));
}
