//! Board geometry: pixel dimensions, responsive square sizing and the
//! square ↔ pixel mapping.
//!
//! The widget is laid out as follows (unflipped):
//!
//! ```text
//!  +----+------------------------+--------+
//!  | 8  |                        |        |
//!  | .. |      8 x 8 grid        |  turn  |
//!  | 1  |                        |  flag  |
//!  +----+------------------------+--------+
//!       | a  b  c  d  e  f  g  h |
//!       +------------------------+
//! ```
//!
//! The rank-label column and file-label row only exist when coordinates are
//! visible, the turn-flag column only when the turn flag is visible.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::BoardError;
use crate::types::{Point, Side, Square};

pub const MIN_SQUARE_SIZE: u32 = 12;
pub const MAX_SQUARE_SIZE: u32 = 96;
pub const DEFAULT_SQUARE_SIZE: u32 = 40;

const TURN_FLAG_SPACING_FACTOR: f64 = 0.1;
const RANK_COORDINATE_WIDTH_FACTOR: f64 = 1.0;
const FILE_COORDINATE_HEIGHT_FACTOR: f64 = 1.4;

/// Pixel dimensions of a widget or panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct BoardSize {
    pub width: u32,
    pub height: u32,
}

impl BoardSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn fits(&self, available_width: f64, available_height: f64) -> bool {
        f64::from(self.width) <= available_width && f64::from(self.height) <= available_height
    }
}

/// Which optional decorations are drawn around the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visibility {
    pub coordinate_visible: bool,
    pub turn_visible: bool,
}

impl Visibility {
    pub fn new(coordinate_visible: bool, turn_visible: bool) -> Self {
        Self {
            coordinate_visible,
            turn_visible,
        }
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::new(true, true)
    }
}

/// An auxiliary panel drawn above or below the board (navigation buttons,
/// player names...). Its extent may depend on the resolved square size.
pub trait PanelExtent {
    fn extent(&self, square_size: u32, visibility: Visibility) -> BoardSize;
}

impl<F> PanelExtent for F
where
    F: Fn(u32, Visibility) -> BoardSize,
{
    fn extent(&self, square_size: u32, visibility: Visibility) -> BoardSize {
        self(square_size, visibility)
    }
}

/// Optional top and bottom panels.
#[derive(Clone, Copy, Default)]
pub struct Panels<'a> {
    pub top: Option<&'a dyn PanelExtent>,
    pub bottom: Option<&'a dyn PanelExtent>,
}

impl<'a> Panels<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn bottom(panel: &'a dyn PanelExtent) -> Self {
        Self {
            top: None,
            bottom: Some(panel),
        }
    }
}

/// Font size of the coordinate labels for a given square size.
pub fn coordinate_font_size(square_size: u32) -> f64 {
    if square_size <= 32 {
        8.0
    } else {
        8.0 + 0.2 * f64::from(square_size - 32)
    }
}

fn rank_label_width(square_size: u32, coordinate_visible: bool) -> u32 {
    if coordinate_visible {
        (coordinate_font_size(square_size) * RANK_COORDINATE_WIDTH_FACTOR).round() as u32
    } else {
        0
    }
}

fn file_label_height(square_size: u32, coordinate_visible: bool) -> u32 {
    if coordinate_visible {
        (coordinate_font_size(square_size) * FILE_COORDINATE_HEIGHT_FACTOR).round() as u32
    } else {
        0
    }
}

fn turn_flag_spacing(square_size: u32) -> u32 {
    (f64::from(square_size) * TURN_FLAG_SPACING_FACTOR).round() as u32
}

fn turn_column_width(square_size: u32, turn_visible: bool) -> u32 {
    if turn_visible {
        (f64::from(square_size) * (1.0 + TURN_FLAG_SPACING_FACTOR)).round() as u32
    } else {
        0
    }
}

/// Dimensions of the board alone (grid, labels and turn flag). Saturates
/// instead of overflowing; sizes meant for display go through
/// [`validate_square_size`] first.
pub fn compute_size(square_size: u32, coordinate_visible: bool, turn_visible: bool) -> BoardSize {
    let grid = square_size.saturating_mul(8);
    BoardSize {
        width: grid
            .saturating_add(rank_label_width(square_size, coordinate_visible))
            .saturating_add(turn_column_width(square_size, turn_visible)),
        height: grid.saturating_add(file_label_height(square_size, coordinate_visible)),
    }
}

pub fn validate_square_size(square_size: u32) -> Result<(), BoardError> {
    if !(MIN_SQUARE_SIZE..=MAX_SQUARE_SIZE).contains(&square_size) {
        return Err(BoardError::illegal_argument(
            "squareSize",
            format!("must be within {MIN_SQUARE_SIZE}..={MAX_SQUARE_SIZE}"),
        ));
    }
    Ok(())
}

/// Dimensions of the board stacked with its optional panels.
pub fn compute_size_with_panels(square_size: u32, visibility: Visibility, panels: &Panels<'_>) -> BoardSize {
    let board = compute_size(square_size, visibility.coordinate_visible, visibility.turn_visible);
    let mut size = board;
    for panel in [panels.top, panels.bottom].into_iter().flatten() {
        let extent = panel.extent(square_size, visibility);
        size.width = size.width.max(extent.width);
        size.height = size.height.saturating_add(extent.height);
    }
    size
}

// =============================================================================
// Small-screen limits
// =============================================================================

/// Override applied when the viewport is at most `width` pixels wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmallScreenLimit {
    pub width: u32,
    #[serde(default)]
    pub square_size: Option<u32>,
    #[serde(default)]
    pub coordinate_visible: Option<bool>,
    #[serde(default)]
    pub turn_visible: Option<bool>,
}

impl SmallScreenLimit {
    pub fn new(width: u32) -> Self {
        Self {
            width,
            square_size: None,
            coordinate_visible: None,
            turn_visible: None,
        }
    }

    pub fn with_square_size(mut self, square_size: u32) -> Self {
        self.square_size = Some(square_size);
        self
    }

    pub fn with_coordinate_visible(mut self, visible: bool) -> Self {
        self.coordinate_visible = Some(visible);
        self
    }

    pub fn with_turn_visible(mut self, visible: bool) -> Self {
        self.turn_visible = Some(visible);
        self
    }

    /// Reads a limits table from a loosely typed value (host configuration
    /// objects), naming the first offending field on failure.
    pub fn list_from_json(value: &Value) -> Result<Vec<SmallScreenLimit>, BoardError> {
        let entries = value
            .as_array()
            .ok_or_else(|| BoardError::illegal_argument("smallScreenLimits", "expected an array"))?;

        let mut limits = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let object = entry.as_object().ok_or_else(|| {
                BoardError::illegal_argument(format!("smallScreenLimits[{i}]"), "expected an object")
            })?;

            let width = object
                .get("width")
                .and_then(Value::as_u64)
                .and_then(|w| u32::try_from(w).ok())
                .ok_or_else(|| {
                    BoardError::illegal_argument(
                        format!("smallScreenLimits[{i}].width"),
                        "expected a non-negative integer",
                    )
                })?;

            let square_size = match object.get("squareSize") {
                None | Some(Value::Null) => None,
                Some(v) => Some(v.as_u64().and_then(|s| u32::try_from(s).ok()).ok_or_else(|| {
                    BoardError::illegal_argument(
                        format!("smallScreenLimits[{i}].squareSize"),
                        "expected a non-negative integer",
                    )
                })?),
            };

            let flag = |field: &str| -> Result<Option<bool>, BoardError> {
                match object.get(field) {
                    None | Some(Value::Null) => Ok(None),
                    Some(v) => v.as_bool().map(Some).ok_or_else(|| {
                        BoardError::illegal_argument(format!("smallScreenLimits[{i}].{field}"), "expected a boolean")
                    }),
                }
            };

            limits.push(SmallScreenLimit {
                width,
                square_size,
                coordinate_visible: flag("coordinateVisible")?,
                turn_visible: flag("turnVisible")?,
            });
        }
        Ok(limits)
    }
}

/// The limit applying to `viewport_width`: the smallest threshold that is not
/// exceeded by the viewport. Equal thresholds resolve to the first entry.
pub fn resolve_small_screen_limit(limits: &[SmallScreenLimit], viewport_width: u32) -> Option<&SmallScreenLimit> {
    limits
        .iter()
        .filter(|limit| viewport_width <= limit.width)
        .min_by_key(|limit| limit.width)
}

/// Caps the square size and hides decorations according to the matching limit.
/// A limit can only hide a decoration, never force it on.
pub fn apply_small_screen_limits(
    square_size: u32,
    visibility: Visibility,
    limits: &[SmallScreenLimit],
    viewport_width: Option<u32>,
) -> (u32, Visibility) {
    let Some(limit) = viewport_width.and_then(|w| resolve_small_screen_limit(limits, w)) else {
        return (square_size, visibility);
    };
    let square_size = limit.square_size.map_or(square_size, |cap| square_size.min(cap));
    let visibility = Visibility {
        coordinate_visible: visibility.coordinate_visible && limit.coordinate_visible != Some(false),
        turn_visible: visibility.turn_visible && limit.turn_visible != Some(false),
    };
    (square_size, visibility)
}

// =============================================================================
// Adaptive square size
// =============================================================================

/// Parameters of [`adapt_square_size`].
#[derive(Debug, Clone, PartialEq)]
pub struct SizeOptions {
    pub coordinate_visible: bool,
    pub turn_visible: bool,
    pub min_square_size: u32,
    pub max_square_size: u32,
    pub small_screen_limits: Vec<SmallScreenLimit>,
    /// Current viewport width; small-screen limits are ignored without it.
    pub viewport_width: Option<u32>,
}

impl Default for SizeOptions {
    fn default() -> Self {
        Self {
            coordinate_visible: true,
            turn_visible: true,
            min_square_size: MIN_SQUARE_SIZE,
            max_square_size: MAX_SQUARE_SIZE,
            small_screen_limits: Vec::new(),
            viewport_width: None,
        }
    }
}

impl SizeOptions {
    pub fn new(coordinate_visible: bool, turn_visible: bool) -> Self {
        Self {
            coordinate_visible,
            turn_visible,
            ..Self::default()
        }
    }

    pub fn with_small_screen_limits(mut self, limits: Vec<SmallScreenLimit>, viewport_width: u32) -> Self {
        self.small_screen_limits = limits;
        self.viewport_width = Some(viewport_width);
        self
    }

    fn validate(&self) -> Result<(), BoardError> {
        if self.min_square_size < MIN_SQUARE_SIZE {
            return Err(BoardError::illegal_argument(
                "minSquareSize",
                format!("must be at least {MIN_SQUARE_SIZE}"),
            ));
        }
        if self.max_square_size > MAX_SQUARE_SIZE {
            return Err(BoardError::illegal_argument(
                "maxSquareSize",
                format!("must be at most {MAX_SQUARE_SIZE}"),
            ));
        }
        if self.min_square_size > self.max_square_size {
            return Err(BoardError::illegal_argument(
                "maxSquareSize",
                "must not be smaller than minSquareSize",
            ));
        }
        validate_small_screen_limits(&self.small_screen_limits)
    }
}

pub(crate) fn validate_small_screen_limits(limits: &[SmallScreenLimit]) -> Result<(), BoardError> {
    for (i, limit) in limits.iter().enumerate() {
        if limit.width == 0 {
            return Err(BoardError::illegal_argument(
                format!("smallScreenLimits[{i}].width"),
                "must be positive",
            ));
        }
        if let Some(size) = limit.square_size
            && !(MIN_SQUARE_SIZE..=MAX_SQUARE_SIZE).contains(&size)
        {
            return Err(BoardError::illegal_argument(
                format!("smallScreenLimits[{i}].squareSize"),
                format!("must be within {MIN_SQUARE_SIZE}..={MAX_SQUARE_SIZE}"),
            ));
        }
    }
    Ok(())
}

/// Result of [`adapt_square_size`]: the square size together with the
/// decorations that remain visible once small-screen limits were applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptedSize {
    pub square_size: u32,
    pub coordinate_visible: bool,
    pub turn_visible: bool,
}

fn validate_dimension(name: &str, value: f64) -> Result<(), BoardError> {
    if !value.is_finite() {
        return Err(BoardError::illegal_argument(name, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(BoardError::illegal_argument(name, "must not be negative"));
    }
    Ok(())
}

/// Largest square size such that the board (and its panels) fits in the
/// available rectangle. Falls back to the minimum size when nothing fits.
pub fn adapt_square_size(
    available_width: f64,
    available_height: f64,
    options: &SizeOptions,
    panels: &Panels<'_>,
) -> Result<AdaptedSize, BoardError> {
    validate_dimension("width", available_width)?;
    validate_dimension("height", available_height)?;
    options.validate()?;

    let (max_square_size, visibility) = apply_small_screen_limits(
        options.max_square_size,
        Visibility::new(options.coordinate_visible, options.turn_visible),
        &options.small_screen_limits,
        options.viewport_width,
    );
    let min_square_size = options.min_square_size.min(max_square_size);

    let fits = |size: u32| compute_size_with_panels(size, visibility, panels).fits(available_width, available_height);

    // compute_size grows monotonically with the square size.
    let square_size = if !fits(min_square_size) {
        min_square_size
    } else {
        let (mut lo, mut hi) = (min_square_size, max_square_size);
        while lo < hi {
            let mid = lo + (hi - lo).div_ceil(2);
            if fits(mid) {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        lo
    };

    debug!(
        available_width,
        available_height, square_size, "adapted square size"
    );
    Ok(AdaptedSize {
        square_size,
        coordinate_visible: visibility.coordinate_visible,
        turn_visible: visibility.turn_visible,
    })
}

// =============================================================================
// Square <-> pixel mapping
// =============================================================================

/// Display cell `(column, row)` of a square, row 0 at the top.
pub fn display_cell(square: Square, flipped: bool) -> (u8, u8) {
    if flipped {
        (7 - square.file(), square.rank())
    } else {
        (square.file(), 7 - square.rank())
    }
}

/// Rotates a display cell by half a turn; the flip transform.
pub fn flip_cell((column, row): (u8, u8)) -> (u8, u8) {
    (7 - column, 7 - row)
}

/// Geometry of one rendered board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardLayout {
    pub square_size: u32,
    pub visibility: Visibility,
    pub flipped: bool,
    pub rank_label_width: u32,
    pub file_label_height: u32,
    pub turn_column_width: u32,
    pub font_size: f64,
}

impl BoardLayout {
    pub fn new(square_size: u32, visibility: Visibility, flipped: bool) -> Self {
        Self {
            square_size,
            visibility,
            flipped,
            rank_label_width: rank_label_width(square_size, visibility.coordinate_visible),
            file_label_height: file_label_height(square_size, visibility.coordinate_visible),
            turn_column_width: turn_column_width(square_size, visibility.turn_visible),
            font_size: coordinate_font_size(square_size),
        }
    }

    pub fn size(&self) -> BoardSize {
        compute_size(
            self.square_size,
            self.visibility.coordinate_visible,
            self.visibility.turn_visible,
        )
    }

    fn square(&self) -> f64 {
        f64::from(self.square_size)
    }

    /// Side length of the 8x8 grid.
    pub fn grid_extent(&self) -> f64 {
        self.square() * 8.0
    }

    pub fn grid_origin(&self) -> Point {
        Point::new(f64::from(self.rank_label_width), 0.0)
    }

    pub fn cell_origin(&self, (column, row): (u8, u8)) -> Point {
        let origin = self.grid_origin();
        Point::new(
            origin.x + f64::from(column) * self.square(),
            origin.y + f64::from(row) * self.square(),
        )
    }

    /// Top-left corner of a square.
    pub fn square_origin(&self, square: Square) -> Point {
        self.cell_origin(display_cell(square, self.flipped))
    }

    pub fn square_center(&self, square: Square) -> Point {
        let origin = self.square_origin(square);
        let half = self.square() / 2.0;
        Point::new(origin.x + half, origin.y + half)
    }

    /// Square under a pixel, or `None` for the label margins, the turn-flag
    /// column and anything outside the grid.
    pub fn square_at(&self, point: Point) -> Option<Square> {
        let origin = self.grid_origin();
        let x = point.x - origin.x;
        let y = point.y - origin.y;
        let extent = self.grid_extent();
        if !(0.0..extent).contains(&x) || !(0.0..extent).contains(&y) {
            return None;
        }
        let column = (x / self.square()).floor() as u8;
        let row = (y / self.square()).floor() as u8;
        let (file, rank) = if self.flipped {
            (7 - column, row)
        } else {
            (column, 7 - row)
        };
        Square::new(file, rank)
    }

    /// Which side sits at the bottom edge of the grid.
    pub fn bottom_side(&self) -> Side {
        if self.flipped { Side::Black } else { Side::White }
    }

    /// Top-left corner of the turn flag, drawn next to the side to move.
    pub fn turn_flag_origin(&self, side_to_move: Side) -> Option<Point> {
        if !self.visibility.turn_visible {
            return None;
        }
        let x = f64::from(self.rank_label_width) + self.grid_extent() + f64::from(turn_flag_spacing(self.square_size));
        let y = if side_to_move == self.bottom_side() {
            self.grid_extent() - self.square()
        } else {
            0.0
        };
        Some(Point::new(x, y))
    }

    /// Anchor (centre) of the label for a 0-based rank.
    pub fn rank_label_anchor(&self, rank: u8) -> Point {
        let row = if self.flipped { rank } else { 7 - rank };
        Point::new(
            f64::from(self.rank_label_width) / 2.0,
            (f64::from(row) + 0.5) * self.square(),
        )
    }

    /// Anchor (centre) of the label for a 0-based file.
    pub fn file_label_anchor(&self, file: u8) -> Point {
        let column = if self.flipped { 7 - file } else { file };
        Point::new(
            f64::from(self.rank_label_width) + (f64::from(column) + 0.5) * self.square(),
            self.grid_extent() + f64::from(self.file_label_height) / 2.0,
        )
    }
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod geometry_tests;
