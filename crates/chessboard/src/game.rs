//! Game tree: a main line with nested variations, each move addressed by an
//! opaque node id.
//!
//! Id scheme: `"start"` is the initial position of the main line, `"12w"` /
//! `"12b"` the position after White's / Black's 12th move. A variation that
//! replaces node `A` starts at `"A-v0"` (position before `A`'s move) and its
//! moves are `"A-v0-12w"`, and so on recursively.

use std::collections::HashMap;

use tracing::debug;

use crate::engine::{MoveDescriptor, RulesEngine};
use crate::error::{NotationError, NotationErrorKind};
use crate::navigation::GameTree;
use crate::types::Side;

pub const MAIN_VARIATION_ID: &str = "start";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeRef {
    VariationStart(usize),
    Move(usize),
}

#[derive(Debug, Clone)]
struct VariationData {
    id: String,
    /// Node this variation is an alternative to (`None` for the main line).
    anchor: Option<usize>,
    moves: Vec<usize>,
    fullmove: u32,
    side: Side,
    comment: Option<String>,
}

#[derive(Debug, Clone)]
struct NodeData<P> {
    id: String,
    variation: usize,
    mv: MoveDescriptor,
    notation: String,
    position_after: P,
    fullmove: u32,
    side: Side,
    variations: Vec<usize>,
    comment: Option<String>,
    nags: Vec<String>,
}

/// Read-only view of one move of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveNode<'a> {
    pub id: &'a str,
    pub notation: &'a str,
    pub mv: &'a MoveDescriptor,
    pub fullmove: u32,
    pub side: Side,
    pub comment: Option<&'a str>,
    pub nags: &'a [String],
    /// Ids of the variations branching off before this move.
    pub variations: Vec<&'a str>,
}

pub struct Game<E: RulesEngine> {
    engine: E,
    headers: Vec<(String, String)>,
    initial: E::Position,
    variations: Vec<VariationData>,
    nodes: Vec<NodeData<E::Position>>,
    index: HashMap<String, NodeRef>,
    result: Option<String>,
}

impl<E: RulesEngine> Game<E> {
    /// Empty game from the standard starting position.
    pub fn new(engine: E) -> Self {
        let initial = engine.start_position();
        Self::with_initial(engine, initial, 1)
    }

    pub fn from_fen(engine: E, fen: &str) -> Result<Self, NotationError> {
        let initial = engine.parse_position(fen)?;
        Ok(Self::with_initial(engine, initial, fullmove_of(fen)))
    }

    fn with_initial(engine: E, initial: E::Position, fullmove: u32) -> Self {
        let side = engine.turn(&initial);
        let mut index = HashMap::new();
        index.insert(MAIN_VARIATION_ID.to_string(), NodeRef::VariationStart(0));
        Self {
            engine,
            headers: Vec::new(),
            initial,
            variations: vec![VariationData {
                id: MAIN_VARIATION_ID.to_string(),
                anchor: None,
                moves: Vec::new(),
                fullmove,
                side,
                comment: None,
            }],
            nodes: Vec::new(),
            index,
            result: None,
        }
    }

    /// Parses a single game in PGN: tag pairs, movetext with nested
    /// variations, comments, NAGs and the result token.
    pub fn parse(engine: E, pgn: &str) -> Result<Self, NotationError> {
        PgnParser::new(pgn).parse(engine)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn main_variation(&self) -> &str {
        MAIN_VARIATION_ID
    }

    /// Position at a node (after its move) or at a variation start.
    pub fn position(&self, id: &str) -> Option<&E::Position> {
        match self.index.get(id)? {
            NodeRef::VariationStart(v) => Some(self.variation_initial(*v)),
            NodeRef::Move(n) => Some(&self.nodes[*n].position_after),
        }
    }

    /// Position before the move of a node.
    pub fn position_before(&self, id: &str) -> Option<&E::Position> {
        match self.index.get(id)? {
            NodeRef::VariationStart(_) => None,
            NodeRef::Move(n) => Some(self.position_before_node(*n)),
        }
    }

    pub fn move_node(&self, id: &str) -> Option<MoveNode<'_>> {
        match self.index.get(id)? {
            NodeRef::Move(n) => Some(self.view(*n)),
            NodeRef::VariationStart(_) => None,
        }
    }

    /// Moves of a variation, in order.
    pub fn variation_moves(&self, variation_id: &str) -> Vec<MoveNode<'_>> {
        match self.index.get(variation_id) {
            Some(NodeRef::VariationStart(v)) => self.variations[*v].moves.iter().map(|&n| self.view(n)).collect(),
            _ => Vec::new(),
        }
    }

    /// Comment placed before the first move of a variation.
    pub fn variation_comment(&self, variation_id: &str) -> Option<&str> {
        match self.index.get(variation_id)? {
            NodeRef::VariationStart(v) => self.variations[*v].comment.as_deref(),
            NodeRef::Move(_) => None,
        }
    }

    /// Appends a move at the end of a variation and returns the new node id.
    pub fn push_move(&mut self, variation_id: &str, notation: &str) -> Result<String, NotationError> {
        let Some(NodeRef::VariationStart(v)) = self.index.get(variation_id).copied() else {
            return Err(NotationError::new(
                NotationErrorKind::InvalidPgn,
                format!("Unknown variation `{variation_id}`"),
            ));
        };
        let before = self.variation_end_position(v).clone();
        let mv = self.engine.parse_move(&before, notation)?;
        Ok(self.append(v, &before, mv))
    }

    /// Opens a new variation as an alternative to the move of `node_id`.
    pub fn add_variation(&mut self, node_id: &str) -> Result<String, NotationError> {
        let Some(NodeRef::Move(n)) = self.index.get(node_id).copied() else {
            return Err(NotationError::new(
                NotationErrorKind::InvalidPgn,
                format!("Cannot branch a variation off `{node_id}`"),
            ));
        };
        Ok(self.open_variation(n))
    }

    fn open_variation(&mut self, anchor: usize) -> String {
        let k = self.nodes[anchor].variations.len();
        let id = format!("{}-v{k}", self.nodes[anchor].id);
        let v = self.variations.len();
        self.variations.push(VariationData {
            id: id.clone(),
            anchor: Some(anchor),
            moves: Vec::new(),
            fullmove: self.nodes[anchor].fullmove,
            side: self.nodes[anchor].side,
            comment: None,
        });
        self.nodes[anchor].variations.push(v);
        self.index.insert(id.clone(), NodeRef::VariationStart(v));
        id
    }

    fn append(&mut self, v: usize, before: &E::Position, mv: MoveDescriptor) -> String {
        let notation = self.engine.format_move(before, &mv);
        let position_after = match self.engine.apply_move(before, &mv) {
            Ok(position) => position,
            Err(err) => {
                // parse_move only hands out legal moves
                debug!(%err, "engine refused its own move");
                before.clone()
            }
        };
        let (fullmove, side) = match self.variations[v].moves.last() {
            Some(&last) => {
                let prev = &self.nodes[last];
                match prev.side {
                    Side::White => (prev.fullmove, Side::Black),
                    Side::Black => (prev.fullmove + 1, Side::White),
                }
            }
            None => (self.variations[v].fullmove, self.variations[v].side),
        };
        let suffix = format!("{fullmove}{}", side_code(side));
        let id = match v {
            0 => suffix,
            _ => format!("{}-{suffix}", self.variations[v].id),
        };
        let n = self.nodes.len();
        self.nodes.push(NodeData {
            id: id.clone(),
            variation: v,
            mv,
            notation,
            position_after,
            fullmove,
            side,
            variations: Vec::new(),
            comment: None,
            nags: Vec::new(),
        });
        self.variations[v].moves.push(n);
        self.index.insert(id.clone(), NodeRef::Move(n));
        id
    }

    fn view(&self, n: usize) -> MoveNode<'_> {
        let node = &self.nodes[n];
        MoveNode {
            id: &node.id,
            notation: &node.notation,
            mv: &node.mv,
            fullmove: node.fullmove,
            side: node.side,
            comment: node.comment.as_deref(),
            nags: &node.nags,
            variations: node
                .variations
                .iter()
                .map(|&v| self.variations[v].id.as_str())
                .collect(),
        }
    }

    fn variation_initial(&self, v: usize) -> &E::Position {
        match self.variations[v].anchor {
            Some(anchor) => self.position_before_node(anchor),
            None => &self.initial,
        }
    }

    fn position_before_node(&self, n: usize) -> &E::Position {
        let node = &self.nodes[n];
        let moves = &self.variations[node.variation].moves;
        match moves.iter().position(|&m| m == n) {
            Some(i) if i > 0 => &self.nodes[moves[i - 1]].position_after,
            _ => self.variation_initial(node.variation),
        }
    }

    fn variation_end_position(&self, v: usize) -> &E::Position {
        match self.variations[v].moves.last() {
            Some(&last) => &self.nodes[last].position_after,
            None => self.variation_initial(v),
        }
    }

    fn locate(&self, id: &str) -> Option<(usize, Option<usize>)> {
        match self.index.get(id)? {
            NodeRef::VariationStart(v) => Some((*v, None)),
            NodeRef::Move(n) => {
                let v = self.nodes[*n].variation;
                let i = self.variations[v].moves.iter().position(|m| m == n)?;
                Some((v, Some(i)))
            }
        }
    }
}

impl<E: RulesEngine> GameTree for Game<E> {
    fn has_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    fn previous_in_variation(&self, id: &str) -> Option<String> {
        let (v, i) = self.locate(id)?;
        let variation = &self.variations[v];
        match i? {
            0 => Some(variation.id.clone()),
            i => Some(self.nodes[variation.moves[i - 1]].id.clone()),
        }
    }

    fn next_in_variation(&self, id: &str) -> Option<String> {
        let (v, i) = self.locate(id)?;
        let next = i.map_or(0, |i| i + 1);
        self.variations[v].moves.get(next).map(|&n| self.nodes[n].id.clone())
    }

    fn variation_start(&self, id: &str) -> Option<String> {
        let (v, _) = self.locate(id)?;
        Some(self.variations[v].id.clone())
    }

    fn variation_parent(&self, id: &str) -> Option<String> {
        let (v, i) = self.locate(id)?;
        if i.is_some() {
            return None;
        }
        let anchor = self.variations[v].anchor?;
        self.previous_in_variation(&self.nodes[anchor].id)
    }
}

fn side_code(side: Side) -> char {
    match side {
        Side::White => 'w',
        Side::Black => 'b',
    }
}

/// Full-move number field of a FEN string (1 when absent or malformed).
fn fullmove_of(fen: &str) -> u32 {
    fen.split_whitespace()
        .nth(5)
        .and_then(|field| field.parse().ok())
        .filter(|&n| n > 0)
        .unwrap_or(1)
}

// =============================================================================
// PGN parsing
// =============================================================================

const RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

struct PgnParser {
    chars: Vec<char>,
    pos: usize,
}

impl PgnParser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, index: usize, message: impl Into<String>) -> NotationError {
        let line = 1 + self.chars[..index.min(self.chars.len())]
            .iter()
            .filter(|&&c| c == '\n')
            .count();
        NotationError::new(NotationErrorKind::InvalidPgn, message).at(index, line)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Reads up to (not including) `terminator`; errors when it never comes.
    fn read_until(&mut self, terminator: char, what: &str) -> Result<String, NotationError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == terminator {
                let text: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                return Ok(text);
            }
            self.pos += 1;
        }
        Err(self.error(start.saturating_sub(1), format!("Unterminated {what}")))
    }

    /// Skips a `;` comment; it may run to the end of the input.
    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_inline_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace() && c != '\n') {
            self.pos += 1;
        }
    }

    /// Reads a quoted tag value, unescaping `\"` and `\\`.
    fn read_quoted(&mut self, tag_start: usize) -> Result<String, NotationError> {
        if self.peek() != Some('"') {
            return Err(self.error(tag_start, "Tag value must be quoted"));
        }
        self.pos += 1;
        let mut value = String::new();
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '"' => return Ok(value),
                '\\' => match self.peek() {
                    Some(escaped @ ('"' | '\\')) => {
                        self.pos += 1;
                        value.push(escaped);
                    }
                    _ => value.push(c),
                },
                '\n' => break,
                _ => value.push(c),
            }
        }
        Err(self.error(tag_start, "Unterminated tag value"))
    }

    fn read_word(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '(' | ')' | '{' | '}' | '[' | ']' | ';') {
                break;
            }
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// `[Name "value"]`, the opening bracket already consumed.
    fn parse_header(&mut self) -> Result<(String, String), NotationError> {
        let start = self.pos - 1;
        self.skip_inline_whitespace();
        let name = self.read_word();
        if name.is_empty() {
            return Err(self.error(start, "Malformed tag pair"));
        }
        self.skip_inline_whitespace();
        let value = self.read_quoted(start)?;
        self.skip_inline_whitespace();
        if self.peek() != Some(']') {
            return Err(self.error(start, "Unterminated tag pair"));
        }
        self.pos += 1;
        Ok((name, value))
    }

    fn parse<E: RulesEngine>(mut self, engine: E) -> Result<Game<E>, NotationError> {
        // Tag pairs come first; a FEN tag changes the initial position.
        let mut headers = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() != Some('[') {
                break;
            }
            self.pos += 1;
            headers.push(self.parse_header()?);
        }

        let mut game = match headers.iter().find(|(name, _)| name == "FEN") {
            Some((_, fen)) => Game::from_fen(engine, fen).map_err(|err| self.error(0, err.message))?,
            None => Game::new(engine),
        };
        game.headers = headers;

        // (variation, last node played in it)
        let mut current: (usize, Option<usize>) = (0, None);
        let mut stack: Vec<((usize, Option<usize>), usize)> = Vec::new();

        loop {
            self.skip_whitespace();
            let start = self.pos;
            let Some(c) = self.peek() else { break };
            match c {
                '{' => {
                    self.pos += 1;
                    let comment = self.read_until('}', "comment")?;
                    let comment = comment.split_whitespace().collect::<Vec<_>>().join(" ");
                    match current.1 {
                        Some(n) => game.nodes[n].comment = Some(comment),
                        None => game.variations[current.0].comment = Some(comment),
                    }
                }
                ';' => {
                    self.skip_line();
                }
                '(' => {
                    self.pos += 1;
                    let anchor = current
                        .1
                        .ok_or_else(|| self.error(start, "Variation without a preceding move"))?;
                    let id = game.open_variation(anchor);
                    let v = match game.index.get(&id) {
                        Some(NodeRef::VariationStart(v)) => *v,
                        _ => return Err(self.error(start, "Variation could not be opened")),
                    };
                    stack.push((current, start));
                    current = (v, None);
                }
                ')' => {
                    self.pos += 1;
                    current = stack
                        .pop()
                        .map(|(outer, _)| outer)
                        .ok_or_else(|| self.error(start, "Unexpected `)`"))?;
                }
                '$' => {
                    self.pos += 1;
                    let nag = self.read_word();
                    if let Some(n) = current.1 {
                        game.nodes[n].nags.push(format!("${nag}"));
                    }
                }
                '}' | ']' | '[' => {
                    return Err(self.error(start, format!("Unexpected `{c}`")));
                }
                _ => {
                    let word = self.read_word();
                    if RESULTS.contains(&word.as_str()) {
                        if !stack.is_empty() {
                            return Err(self.error(start, "Result inside a variation"));
                        }
                        game.result = Some(word);
                        continue;
                    }
                    let san = strip_move_number(&word);
                    if san.is_empty() {
                        continue;
                    }
                    let (san, annotation) = split_annotation(san);
                    let v = current.0;
                    let before = match current.1 {
                        Some(n) => game.nodes[n].position_after.clone(),
                        None => game.variation_initial(v).clone(),
                    };
                    let mv = game
                        .engine
                        .parse_move(&before, san)
                        .map_err(|_| self.error(start, format!("Invalid move `{san}`")))?;
                    let id = game.append(v, &before, mv);
                    let n = match game.index.get(&id) {
                        Some(NodeRef::Move(n)) => *n,
                        _ => return Err(self.error(start, "Move could not be recorded")),
                    };
                    if let Some(annotation) = annotation {
                        game.nodes[n].nags.push(annotation.to_string());
                    }
                    current = (v, Some(n));
                }
            }
        }

        if let Some((_, open)) = stack.last() {
            return Err(self.error(*open, "Unterminated variation"));
        }
        debug!(nodes = game.nodes.len(), variations = game.variations.len(), "parsed game");
        Ok(game)
    }
}

/// Drops a leading move number (`12.`, `12...`), possibly glued to the move.
fn strip_move_number(word: &str) -> &str {
    let digits = word.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return word;
    }
    let rest = &word[digits..];
    if rest.starts_with('.') {
        rest.trim_start_matches('.')
    } else {
        word
    }
}

/// Splits trailing `!`/`?` annotations from a SAN token.
fn split_annotation(san: &str) -> (&str, Option<&str>) {
    let trimmed = san.trim_end_matches(['!', '?']);
    if trimmed.len() == san.len() {
        (san, None)
    } else {
        (trimmed, Some(&san[trimmed.len()..]))
    }
}

#[cfg(test)]
#[path = "game_tests.rs"]
mod game_tests;
