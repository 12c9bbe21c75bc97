//! Square, text and arrow annotations and their compact text notation.
//!
//! Notation: comma-separated tokens made of a color code (`B`, `G`, `R`, `Y`),
//! a symbol for text markers (one `[A-Za-z0-9]` char, or `(name)` for named
//! shapes), then one square, or two squares for arrows:
//!
//! ```text
//! square markers   Ga1,Yc5
//! text markers     RAe4,G(plus)d5
//! arrow markers    Re4d6,Bb1c3
//! ```
//!
//! Parsing never fails: anything not matching the grammar is skipped.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::types::{Square, Vector};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AnnotationColor {
    Blue,
    Green,
    Red,
    Yellow,
}

impl AnnotationColor {
    pub const ALL: [AnnotationColor; 4] = [
        AnnotationColor::Blue,
        AnnotationColor::Green,
        AnnotationColor::Red,
        AnnotationColor::Yellow,
    ];

    pub fn code(self) -> char {
        match self {
            AnnotationColor::Blue => 'B',
            AnnotationColor::Green => 'G',
            AnnotationColor::Red => 'R',
            AnnotationColor::Yellow => 'Y',
        }
    }

    pub fn from_code(c: char) -> Option<AnnotationColor> {
        match c {
            'B' => Some(AnnotationColor::Blue),
            'G' => Some(AnnotationColor::Green),
            'R' => Some(AnnotationColor::Red),
            'Y' => Some(AnnotationColor::Yellow),
            _ => None,
        }
    }

    /// Lenient lookup used for configuration maps: `g`, `G` or `green`.
    pub fn from_name(name: &str) -> Option<AnnotationColor> {
        let name = name.trim();
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return AnnotationColor::from_code(c.to_ascii_uppercase());
        }
        match name.to_ascii_lowercase().as_str() {
            "blue" => Some(AnnotationColor::Blue),
            "green" => Some(AnnotationColor::Green),
            "red" => Some(AnnotationColor::Red),
            "yellow" => Some(AnnotationColor::Yellow),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NamedSymbol {
    Plus,
    Times,
    Dot,
    Circle,
    Exclamation,
    Question,
}

impl NamedSymbol {
    pub const ALL: [NamedSymbol; 6] = [
        NamedSymbol::Plus,
        NamedSymbol::Times,
        NamedSymbol::Dot,
        NamedSymbol::Circle,
        NamedSymbol::Exclamation,
        NamedSymbol::Question,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NamedSymbol::Plus => "plus",
            NamedSymbol::Times => "times",
            NamedSymbol::Dot => "dot",
            NamedSymbol::Circle => "circle",
            NamedSymbol::Exclamation => "exclamation",
            NamedSymbol::Question => "question",
        }
    }

    pub fn from_name(name: &str) -> Option<NamedSymbol> {
        NamedSymbol::ALL.into_iter().find(|s| s.name() == name)
    }
}

/// Glyph drawn by a text marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnnotationSymbol {
    /// `A-Z`, `a-z` or `0-9`.
    Char(char),
    Named(NamedSymbol),
}

impl AnnotationSymbol {
    pub fn from_char(c: char) -> Option<AnnotationSymbol> {
        c.is_ascii_alphanumeric().then_some(AnnotationSymbol::Char(c))
    }

    /// Parses either a single glyph char or a named symbol.
    pub fn parse(s: &str) -> Option<AnnotationSymbol> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => AnnotationSymbol::from_char(c),
            _ => NamedSymbol::from_name(s).map(AnnotationSymbol::Named),
        }
    }

    /// Text drawn on the board.
    pub fn glyph(self) -> String {
        match self {
            AnnotationSymbol::Char(c) => c.to_string(),
            AnnotationSymbol::Named(NamedSymbol::Plus) => "+".to_string(),
            AnnotationSymbol::Named(NamedSymbol::Times) => "\u{00d7}".to_string(),
            AnnotationSymbol::Named(NamedSymbol::Dot) => "\u{2022}".to_string(),
            AnnotationSymbol::Named(NamedSymbol::Circle) => "\u{25cb}".to_string(),
            AnnotationSymbol::Named(NamedSymbol::Exclamation) => "!".to_string(),
            AnnotationSymbol::Named(NamedSymbol::Question) => "?".to_string(),
        }
    }
}

impl fmt::Display for AnnotationSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationSymbol::Char(c) => write!(f, "{c}"),
            AnnotationSymbol::Named(named) => write!(f, "({})", named.name()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextMarker {
    pub symbol: AnnotationSymbol,
    pub color: AnnotationColor,
}

impl TextMarker {
    pub fn new(symbol: AnnotationSymbol, color: AnnotationColor) -> Self {
        Self { symbol, color }
    }
}

pub type SquareMarkerSet = BTreeMap<Square, AnnotationColor>;
pub type TextMarkerSet = BTreeMap<Square, TextMarker>;
pub type ArrowMarkerSet = BTreeMap<Vector, AnnotationColor>;

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|t| !t.is_empty())
}

fn split_color(token: &str) -> Option<(AnnotationColor, &str)> {
    let first = token.chars().next()?;
    let color = AnnotationColor::from_code(first)?;
    Some((color, &token[first.len_utf8()..]))
}

fn skipped(kind: &str, token: &str) {
    trace!(kind, token, "skipping malformed marker token");
}

// =============================================================================
// Square markers
// =============================================================================

pub fn parse_square_markers(text: &str) -> SquareMarkerSet {
    let mut markers = SquareMarkerSet::new();
    for token in tokens(text) {
        match split_color(token).and_then(|(color, rest)| Some((Square::parse(rest)?, color))) {
            Some((square, color)) => {
                markers.insert(square, color);
            }
            None => skipped("square", token),
        }
    }
    markers
}

pub fn flatten_square_markers(markers: &SquareMarkerSet) -> String {
    markers
        .iter()
        .map(|(square, color)| format!("{}{square}", color.code()))
        .collect::<Vec<_>>()
        .join(",")
}

// =============================================================================
// Text markers
// =============================================================================

fn parse_text_token(token: &str) -> Option<(Square, TextMarker)> {
    let (color, rest) = split_color(token)?;
    if !rest.is_ascii() || rest.len() < 3 {
        return None;
    }
    let (symbol_part, square_part) = rest.split_at(rest.len() - 2);
    let square = Square::parse(square_part)?;
    let symbol = match symbol_part.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(name) => AnnotationSymbol::Named(NamedSymbol::from_name(name)?),
        None if symbol_part.len() == 1 => AnnotationSymbol::from_char(symbol_part.chars().next()?)?,
        None => return None,
    };
    Some((square, TextMarker::new(symbol, color)))
}

pub fn parse_text_markers(text: &str) -> TextMarkerSet {
    let mut markers = TextMarkerSet::new();
    for token in tokens(text) {
        match parse_text_token(token) {
            Some((square, marker)) => {
                markers.insert(square, marker);
            }
            None => skipped("text", token),
        }
    }
    markers
}

pub fn flatten_text_markers(markers: &TextMarkerSet) -> String {
    markers
        .iter()
        .filter(|(_, marker)| match marker.symbol {
            AnnotationSymbol::Char(c) => c.is_ascii_alphanumeric(),
            AnnotationSymbol::Named(_) => true,
        })
        .map(|(square, marker)| format!("{}{}{square}", marker.color.code(), marker.symbol))
        .collect::<Vec<_>>()
        .join(",")
}

// =============================================================================
// Arrow markers
// =============================================================================

pub fn parse_arrow_markers(text: &str) -> ArrowMarkerSet {
    let mut markers = ArrowMarkerSet::new();
    for token in tokens(text) {
        let parsed = split_color(token)
            .and_then(|(color, rest)| Some((Vector::parse(rest)?, color)))
            .filter(|(vector, _)| !vector.is_degenerate());
        match parsed {
            Some((vector, color)) => {
                markers.insert(vector, color);
            }
            None => skipped("arrow", token),
        }
    }
    markers
}

pub fn flatten_arrow_markers(markers: &ArrowMarkerSet) -> String {
    markers
        .iter()
        .filter(|(vector, _)| !vector.is_degenerate())
        .map(|(vector, color)| format!("{}{vector}", color.code()))
        .collect::<Vec<_>>()
        .join(",")
}

// =============================================================================
// Configuration form
// =============================================================================

/// Marker set as written in a configuration file: either the compact
/// notation or a table keyed by square (or square pair for arrows).
///
/// ```toml
/// squareMarkers = "Ga1,Yc5"
/// arrowMarkers = { e2e4 = "r" }
/// textMarkers = { e4 = "Ag", d5 = "(plus)r" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkerSpec {
    Notation(String),
    Table(BTreeMap<String, String>),
}

impl Default for MarkerSpec {
    fn default() -> Self {
        MarkerSpec::Notation(String::new())
    }
}

impl MarkerSpec {
    pub fn square_markers(&self) -> SquareMarkerSet {
        match self {
            MarkerSpec::Notation(text) => parse_square_markers(text),
            MarkerSpec::Table(table) => table
                .iter()
                .filter_map(|(key, value)| Some((Square::parse(key.trim())?, AnnotationColor::from_name(value)?)))
                .collect(),
        }
    }

    pub fn arrow_markers(&self) -> ArrowMarkerSet {
        match self {
            MarkerSpec::Notation(text) => parse_arrow_markers(text),
            MarkerSpec::Table(table) => table
                .iter()
                .filter_map(|(key, value)| Some((Vector::parse(key.trim())?, AnnotationColor::from_name(value)?)))
                .filter(|(vector, _)| !vector.is_degenerate())
                .collect(),
        }
    }

    /// Table values are the symbol followed by the color letter (`"Ag"`,
    /// `"(plus)r"`).
    pub fn text_markers(&self) -> TextMarkerSet {
        match self {
            MarkerSpec::Notation(text) => parse_text_markers(text),
            MarkerSpec::Table(table) => table
                .iter()
                .filter_map(|(key, value)| {
                    let square = Square::parse(key.trim())?;
                    let value = value.trim();
                    let color_char = value.chars().last()?;
                    let color = AnnotationColor::from_code(color_char.to_ascii_uppercase())?;
                    let symbol_part = &value[..value.len() - color_char.len_utf8()];
                    let symbol = match symbol_part.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
                        Some(name) => AnnotationSymbol::Named(NamedSymbol::from_name(name)?),
                        None => AnnotationSymbol::parse(symbol_part)?,
                    };
                    Some((square, TextMarker::new(symbol, color)))
                })
                .collect(),
        }
    }
}

/// The three marker layers drawn on a board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers {
    pub squares: SquareMarkerSet,
    pub texts: TextMarkerSet,
    pub arrows: ArrowMarkerSet,
}

impl Markers {
    pub fn is_empty(&self) -> bool {
        self.squares.is_empty() && self.texts.is_empty() && self.arrows.is_empty()
    }
}

impl TryFrom<String> for AnnotationColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Serialized as the lowercase color letter, the form used in configuration.
impl From<AnnotationColor> for String {
    fn from(color: AnnotationColor) -> String {
        color.code().to_ascii_lowercase().to_string()
    }
}

impl FromStr for AnnotationColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnnotationColor::from_name(s).ok_or_else(|| format!("unknown annotation color `{s}`"))
    }
}

#[cfg(test)]
#[path = "markers_tests.rs"]
mod markers_tests;
