//! Board options as supplied by a host, from TOML files or JSON objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::BoardError;
use crate::geometry::{
    DEFAULT_SQUARE_SIZE, MAX_SQUARE_SIZE, MIN_SQUARE_SIZE, SmallScreenLimit, Visibility, validate_small_screen_limits,
    validate_square_size,
};
use crate::interaction::InteractionMode;
use crate::markers::{AnnotationColor, MarkerSpec, Markers};
use crate::theme::{DEFAULT_COLORSET, DEFAULT_PIECESET};

/// Every option of a board; anything left out takes its default.
///
/// ```toml
/// position = "start"
/// squareSize = 48
/// interactionMode = "playMoves"
/// squareMarkers = "Ge4,Rd5"
/// arrowMarkers = { e2e4 = "b" }
///
/// [[smallScreenLimits]]
/// width = 540
/// squareSize = 32
/// coordinateVisible = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardOptions {
    /// FEN, or `"start"`.
    pub position: String,
    pub square_size: u32,
    pub coordinate_visible: bool,
    pub turn_visible: bool,
    pub flipped: bool,
    pub colorset: String,
    pub pieceset: String,
    pub square_markers: MarkerSpec,
    pub arrow_markers: MarkerSpec,
    pub text_markers: MarkerSpec,
    pub interaction_mode: InteractionMode,
    pub edited_arrow_color: AnnotationColor,
    /// Move played from `position`, in SAN.
    #[serde(rename = "move", skip_serializing_if = "Option::is_none")]
    pub move_notation: Option<String>,
    pub move_arrow_visible: bool,
    pub move_arrow_color: AnnotationColor,
    pub animated: bool,
    pub small_screen_limits: Vec<SmallScreenLimit>,
}

impl Default for BoardOptions {
    fn default() -> Self {
        Self {
            position: "start".to_string(),
            square_size: DEFAULT_SQUARE_SIZE,
            coordinate_visible: true,
            turn_visible: true,
            flipped: false,
            colorset: DEFAULT_COLORSET.to_string(),
            pieceset: DEFAULT_PIECESET.to_string(),
            square_markers: MarkerSpec::default(),
            arrow_markers: MarkerSpec::default(),
            text_markers: MarkerSpec::default(),
            interaction_mode: InteractionMode::None,
            edited_arrow_color: AnnotationColor::Green,
            move_notation: None,
            move_arrow_visible: true,
            move_arrow_color: AnnotationColor::Blue,
            animated: false,
            small_screen_limits: Vec::new(),
        }
    }
}

impl BoardOptions {
    pub fn from_toml_str(text: &str) -> Result<Self, BoardError> {
        let options: BoardOptions = toml::from_str(text)?;
        options.validate()?;
        debug!(square_size = options.square_size, mode = ?options.interaction_mode, "loaded board options");
        Ok(options)
    }

    /// Loosely typed host object. Small-screen limits are checked field by
    /// field so the error names the offending entry.
    pub fn from_json_value(value: &Value) -> Result<Self, BoardError> {
        let limits = match value.get("smallScreenLimits") {
            None | Some(Value::Null) => Vec::new(),
            Some(raw) => SmallScreenLimit::list_from_json(raw)?,
        };
        let mut value = value.clone();
        if let Some(object) = value.as_object_mut() {
            object.remove("smallScreenLimits");
        }
        let mut options: BoardOptions = serde_json::from_value(value)?;
        options.small_screen_limits = limits;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), BoardError> {
        validate_square_size(self.square_size)?;
        validate_small_screen_limits(&self.small_screen_limits)
    }

    /// Options safe to lay out: an out-of-range square size is clamped and
    /// malformed small-screen limits are dropped, each with a warning.
    pub fn sanitized(mut self) -> Self {
        if let Err(err) = validate_square_size(self.square_size) {
            let clamped = self.square_size.clamp(MIN_SQUARE_SIZE, MAX_SQUARE_SIZE);
            warn!(%err, clamped, "square size out of range");
            self.square_size = clamped;
        }
        if let Err(err) = validate_small_screen_limits(&self.small_screen_limits) {
            warn!(%err, "dropping malformed small-screen limits");
            self.small_screen_limits
                .retain(|limit| validate_small_screen_limits(std::slice::from_ref(limit)).is_ok());
        }
        self
    }

    /// The FEN to display, resolving the `start` keyword.
    pub fn fen(&self) -> &str {
        match self.position.trim() {
            "start" => crate::engine::START_FEN,
            fen => fen,
        }
    }

    pub fn visibility(&self) -> Visibility {
        Visibility::new(self.coordinate_visible, self.turn_visible)
    }

    pub fn markers(&self) -> Markers {
        Markers {
            squares: self.square_markers.square_markers(),
            texts: self.text_markers.text_markers(),
            arrows: self.arrow_markers.arrow_markers(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
