//! Move list model: the game tree flattened into display tokens.

use crate::engine::RulesEngine;
use crate::game::{Game, MAIN_VARIATION_ID};
use crate::notation::{PieceSymbols, format_move};
use crate::types::Side;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MovetextToken {
    /// `12.` before a White move, `12...` before a Black move.
    MoveNumber { number: u32, side: Side },
    Move {
        node_id: String,
        notation: String,
        nags: Vec<String>,
        selected: bool,
    },
    Comment(String),
    VariationOpen { depth: usize },
    VariationClose { depth: usize },
    Result(String),
}

impl MovetextToken {
    pub fn text(&self) -> String {
        match self {
            MovetextToken::MoveNumber { number, side: Side::White } => format!("{number}."),
            MovetextToken::MoveNumber { number, side: Side::Black } => format!("{number}..."),
            MovetextToken::Move { notation, nags, .. } => {
                let mut text = notation.clone();
                for nag in nags {
                    if nag.starts_with('$') {
                        text.push(' ');
                    }
                    text.push_str(nag);
                }
                text
            }
            MovetextToken::Comment(comment) => format!("{{{comment}}}"),
            MovetextToken::VariationOpen { .. } => "(".to_string(),
            MovetextToken::VariationClose { .. } => ")".to_string(),
            MovetextToken::Result(result) => result.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Movetext {
    pub tokens: Vec<MovetextToken>,
}

impl Movetext {
    pub fn build<E: RulesEngine>(game: &Game<E>, selection: Option<&str>, symbols: &PieceSymbols) -> Self {
        let mut builder = Builder {
            tokens: Vec::new(),
            selection,
            symbols,
        };
        builder.variation(game, MAIN_VARIATION_ID, 0);
        if let Some(result) = game.result() {
            builder.tokens.push(MovetextToken::Result(result.to_string()));
        }
        Movetext { tokens: builder.tokens }
    }

    /// Node id of the selected move, if it is part of the list.
    pub fn selected(&self) -> Option<&str> {
        self.tokens.iter().find_map(|token| match token {
            MovetextToken::Move { node_id, selected: true, .. } => Some(node_id.as_str()),
            _ => None,
        })
    }

    /// Single-line text rendering, PGN style.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let mut glue = false;
        for token in &self.tokens {
            let text = token.text();
            let attach = matches!(token, MovetextToken::VariationClose { .. });
            if !out.is_empty() && !glue && !attach {
                out.push(' ');
            }
            out.push_str(&text);
            glue = matches!(token, MovetextToken::VariationOpen { .. });
        }
        out
    }
}

struct Builder<'a> {
    tokens: Vec<MovetextToken>,
    selection: Option<&'a str>,
    symbols: &'a PieceSymbols,
}

impl Builder<'_> {
    fn variation<E: RulesEngine>(&mut self, game: &Game<E>, variation_id: &str, depth: usize) {
        let mut needs_number = true;
        if let Some(comment) = game.variation_comment(variation_id) {
            self.tokens.push(MovetextToken::Comment(comment.to_string()));
        }
        for node in game.variation_moves(variation_id) {
            if node.side == Side::White || needs_number {
                self.tokens.push(MovetextToken::MoveNumber {
                    number: node.fullmove,
                    side: node.side,
                });
            }
            self.tokens.push(MovetextToken::Move {
                node_id: node.id.to_string(),
                notation: format_move(node.notation, node.side, self.symbols),
                nags: node.nags.to_vec(),
                selected: self.selection == Some(node.id),
            });
            needs_number = false;
            if let Some(comment) = node.comment {
                self.tokens.push(MovetextToken::Comment(comment.to_string()));
                needs_number = true;
            }
            for variation in &node.variations {
                self.tokens.push(MovetextToken::VariationOpen { depth: depth + 1 });
                self.variation(game, variation, depth + 1);
                self.tokens.push(MovetextToken::VariationClose { depth: depth + 1 });
                needs_number = true;
            }
        }
    }
}
