//! Error types.
//!
//! Only [`BoardError`] ever reaches callers as an `Err`. Notation failures are
//! turned into an [`crate::render::ErrorBox`] by the render model, gestures that
//! do not match the active mode are silently dropped, and sound failures are
//! swallowed.

use thiserror::Error;

/// Errors returned synchronously by the sizing, query and configuration APIs.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("illegal argument `{parameter}`: {reason}")]
    IllegalArgument { parameter: String, reason: String },

    #[error("invalid board configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid board configuration object: {0}")]
    Json(#[from] serde_json::Error),
}

impl BoardError {
    pub fn illegal_argument(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        BoardError::IllegalArgument {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending parameter for `IllegalArgument` errors.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            BoardError::IllegalArgument { parameter, .. } => Some(parameter),
            _ => None,
        }
    }
}

/// Which kind of notation failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotationErrorKind {
    InvalidFen,
    InvalidMove,
    InvalidPgn,
}

/// A FEN, SAN or PGN parse failure reported by the rules engine or the game parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct NotationError {
    pub kind: NotationErrorKind,
    pub message: String,
    /// Character offset of the failure in the parsed text, when known.
    pub index: Option<usize>,
    /// 1-based line of the failure, when known.
    pub line: Option<usize>,
}

impl NotationError {
    pub fn new(kind: NotationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            index: None,
            line: None,
        }
    }

    pub fn at(mut self, index: usize, line: usize) -> Self {
        self.index = Some(index);
        self.line = Some(line);
        self
    }
}

/// Failure of a best-effort sound effect.
#[derive(Debug, Error)]
pub enum SoundError {
    #[error("playback interrupted")]
    Interrupted,
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
}
