use super::*;
use crate::engine::ShakmatyEngine;
use crate::types::{PieceKind, Square};

fn parse(pgn: &str) -> Game<ShakmatyEngine> {
    Game::parse(ShakmatyEngine::new(), pgn).unwrap()
}

fn parse_err(pgn: &str) -> NotationError {
    match Game::parse(ShakmatyEngine::new(), pgn) {
        Ok(_) => panic!("expected a parse error for {pgn:?}"),
        Err(err) => err,
    }
}

fn notations(game: &Game<ShakmatyEngine>, variation: &str) -> Vec<String> {
    game.variation_moves(variation)
        .iter()
        .map(|m| m.notation.to_string())
        .collect()
}

const SAMPLE: &str = r#"[Event "Casual"]
[White "Anderssen"]
[Black "Kieseritzky"]
[Result "1-0"]

1. e4 {King's pawn} e5 2. f4 exf4 (2... d5 $1 3. exd5 (3. Nf3) 3... exf4) 3. Bc4!? Qh4+ 1-0
"#;

#[test]
fn test_headers_and_result() {
    let game = parse(SAMPLE);
    assert_eq!(game.header("White"), Some("Anderssen"));
    assert_eq!(game.header("Opening"), None);
    assert_eq!(game.headers().len(), 4);
    assert_eq!(game.result(), Some("1-0"));
}

#[test]
fn test_main_line_ids_and_notation() {
    let game = parse(SAMPLE);
    assert_eq!(notations(&game, "start"), vec!["e4", "e5", "f4", "exf4", "Bc4", "Qh4+"]);
    let ids: Vec<&str> = game.variation_moves("start").iter().map(|m| m.id).collect();
    assert_eq!(ids, vec!["1w", "1b", "2w", "2b", "3w", "3b"]);
}

#[test]
fn test_comments_and_nags() {
    let game = parse(SAMPLE);
    assert_eq!(game.move_node("1w").unwrap().comment, Some("King's pawn"));
    assert_eq!(game.move_node("3w").unwrap().nags, ["!?".to_string()]);
    assert_eq!(game.move_node("2b-v0-2b").unwrap().nags, ["$1".to_string()]);
}

#[test]
fn test_nested_variations() {
    let game = parse(SAMPLE);
    assert_eq!(game.move_node("2b").unwrap().variations, vec!["2b-v0"]);
    assert_eq!(notations(&game, "2b-v0"), vec!["d5", "exd5", "exf4"]);
    assert_eq!(game.move_node("2b-v0-3w").unwrap().variations, vec!["2b-v0-3w-v0"]);
    assert_eq!(notations(&game, "2b-v0-3w-v0"), vec!["Nf3"]);
    assert_eq!(game.move_node("2b-v0-3w-v0-3w").unwrap().side, Side::White);
}

#[test]
fn test_positions_along_the_tree() {
    let game = parse(SAMPLE);
    let engine = game.engine();
    let e4 = Square::parse("e4").unwrap();
    assert_eq!(engine.piece_at(game.position("start").unwrap(), e4), None);
    assert!(engine.piece_at(game.position("1w").unwrap(), e4).is_some());

    // the variation starts from the position before the move it replaces
    let before = game.position_before("2b").unwrap();
    let start = game.position("2b-v0").unwrap();
    assert_eq!(engine.pieces(before), engine.pieces(start));
    assert!(game.position_before("start").is_none());
    assert!(game.position("nope").is_none());
}

#[test]
fn test_fen_tag_sets_initial_position_and_numbering() {
    let game = parse(
        r#"[SetUp "1"]
[FEN "4k3/P7/8/8/8/8/8/4K3 w - - 0 42"]

42. a8=Q+ Kd7 *"#,
    );
    let first = game.move_node("42w").unwrap();
    assert_eq!(first.mv.promotion, Some(PieceKind::Queen));
    assert_eq!(first.notation, "a8=Q+");
    assert!(game.move_node("42b").is_some());
}

#[test]
fn test_black_to_move_start() {
    let game = Game::from_fen(ShakmatyEngine::new(), "4k3/8/8/8/8/8/8/4K2R b K - 3 17").unwrap();
    let mut game = game;
    let id = game.push_move("start", "Kd7").unwrap();
    assert_eq!(id, "17b");
    assert_eq!(game.push_move("start", "O-O").unwrap(), "18w");
}

#[test]
fn test_push_move_and_add_variation() {
    let mut game = Game::new(ShakmatyEngine::new());
    game.push_move("start", "e4").unwrap();
    game.push_move("start", "c5").unwrap();
    let variation = game.add_variation("1b").unwrap();
    assert_eq!(variation, "1b-v0");
    assert_eq!(game.push_move(&variation, "e6").unwrap(), "1b-v0-1b");
    assert_eq!(game.add_variation("1b").unwrap(), "1b-v1");

    assert!(game.push_move("start", "Ke3").is_err());
    assert!(game.push_move("1w", "Nf3").is_err());
    assert!(game.add_variation("start").is_err());
}

#[test]
fn test_line_comment_and_glued_move_numbers() {
    let game = parse("1.e4 ; opening\n1...e5 2.Nf3 *");
    assert_eq!(notations(&game, "start"), vec!["e4", "e5", "Nf3"]);
}

#[test]
fn test_leading_variation_comment() {
    let game = parse("1. e4 ({Alternatively} 1. d4) *");
    assert_eq!(game.variation_comment("1w-v0"), Some("Alternatively"));
}

#[test]
fn test_invalid_move_reports_position() {
    let err = parse_err("1. e4 e5\n2. Ke3 *");
    assert_eq!(err.kind, NotationErrorKind::InvalidPgn);
    assert_eq!(err.line, Some(2));
    assert_eq!(err.index, Some(12));
    assert!(err.message.contains("Ke3"));
}

#[test]
fn test_structural_errors() {
    assert_eq!(parse_err("1. e4 (1. d4").message, "Unterminated variation");
    assert_eq!(parse_err("1. e4 )").index, Some(6));
    assert_eq!(parse_err("(1. e4)").index, Some(0));
    assert_eq!(parse_err("1. e4 {never closed").kind, NotationErrorKind::InvalidPgn);
    assert_eq!(parse_err("[White \"x\"\n1. e4").message, "Unterminated tag pair");
}

#[test]
fn test_tag_values_may_hold_brackets_and_escapes() {
    let game = parse("[Event \"Open [A]\"]\n[Annotator \"The \\\"Sage\\\" \\\\ co\"]\n\n1. e4 e5 *");
    assert_eq!(game.header("Event"), Some("Open [A]"));
    assert_eq!(game.header("Annotator"), Some("The \"Sage\" \\ co"));
    assert_eq!(notations(&game, "start"), vec!["e4", "e5"]);

    assert_eq!(parse_err("[Event Open]").message, "Tag value must be quoted");
    assert_eq!(parse_err("[Event \"Open]\n1. e4").message, "Unterminated tag value");
}

#[test]
fn test_line_comment_at_end_of_input() {
    let game = parse("1. e4 e5 ; no newline after this");
    assert_eq!(notations(&game, "start"), vec!["e4", "e5"]);
}

#[test]
fn test_invalid_fen_tag() {
    let err = parse_err("[FEN \"not a fen\"]\n1. e4 *");
    assert_eq!(err.kind, NotationErrorKind::InvalidPgn);
}

#[test]
fn test_empty_game() {
    let game = parse("");
    assert!(game.variation_moves("start").is_empty());
    assert_eq!(game.result(), None);
}
