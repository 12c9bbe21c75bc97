//! Named colorsets and piecesets.

use tracing::warn;

use crate::markers::AnnotationColor;

pub const DEFAULT_COLORSET: &str = "original";
pub const DEFAULT_PIECESET: &str = "cburnett";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to `0.0..=1.0`.
    pub fn to_unit(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }
}

/// Square and annotation colors of a board theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Colorset {
    pub name: &'static str,
    pub light: Rgb,
    pub dark: Rgb,
    pub blue: Rgb,
    pub green: Rgb,
    pub red: Rgb,
    pub yellow: Rgb,
}

impl Colorset {
    pub fn annotation(&self, color: AnnotationColor) -> Rgb {
        match color {
            AnnotationColor::Blue => self.blue,
            AnnotationColor::Green => self.green,
            AnnotationColor::Red => self.red,
            AnnotationColor::Yellow => self.yellow,
        }
    }
}

const BLUE: Rgb = Rgb::new(0x00, 0x30, 0x88);
const GREEN: Rgb = Rgb::new(0x00, 0x88, 0x00);
const RED: Rgb = Rgb::new(0x88, 0x00, 0x00);
const YELLOW: Rgb = Rgb::new(0xff, 0xbb, 0x00);

const fn colorset(name: &'static str, light: Rgb, dark: Rgb) -> Colorset {
    Colorset {
        name,
        light,
        dark,
        blue: BLUE,
        green: GREEN,
        red: RED,
        yellow: YELLOW,
    }
}

pub const COLORSETS: [Colorset; 11] = [
    colorset("original", Rgb::new(0xf0, 0xde, 0xc7), Rgb::new(0xb5, 0x87, 0x6b)),
    colorset("gray", Rgb::new(0xf8, 0xf8, 0xf8), Rgb::new(0xb8, 0xb8, 0xb8)),
    colorset("scid", Rgb::new(0xf3, 0xf3, 0xf3), Rgb::new(0x73, 0x89, 0xb6)),
    colorset("wikipedia", Rgb::new(0xff, 0xce, 0x9e), Rgb::new(0xd1, 0x8b, 0x47)),
    colorset("xboard", Rgb::new(0xc8, 0xc3, 0x65), Rgb::new(0x77, 0xa2, 0x6d)),
    colorset("coral", Rgb::new(0xb1, 0xe4, 0xb9), Rgb::new(0x70, 0xa2, 0xa3)),
    colorset("dusk", Rgb::new(0xcc, 0xb7, 0xae), Rgb::new(0x70, 0x66, 0x77)),
    colorset("emerald", Rgb::new(0xad, 0xbd, 0x8f), Rgb::new(0x6f, 0x8f, 0x72)),
    colorset("marine", Rgb::new(0x9d, 0xac, 0xff), Rgb::new(0x6f, 0x73, 0xd2)),
    colorset("sandcastle", Rgb::new(0xe3, 0xc1, 0x6f), Rgb::new(0xb8, 0x8b, 0x4a)),
    colorset("wheat", Rgb::new(0xea, 0xf0, 0xce), Rgb::new(0xbb, 0xbe, 0x8e)),
];

pub const PIECESETS: [&str; 6] = ["cburnett", "celtic", "eyes", "fantasy", "skulls", "spatial"];

/// Colorset by name; unknown names fall back to the default one.
pub fn colorset_named(name: &str) -> &'static Colorset {
    if let Some(found) = COLORSETS.iter().find(|c| c.name == name) {
        return found;
    }
    warn!(name, fallback = DEFAULT_COLORSET, "unknown colorset");
    &COLORSETS[0]
}

/// Canonical pieceset name; unknown names fall back to the default one.
pub fn pieceset_named(name: &str) -> &'static str {
    if let Some(found) = PIECESETS.iter().find(|p| **p == name) {
        return found;
    }
    warn!(name, fallback = DEFAULT_PIECESET, "unknown pieceset");
    DEFAULT_PIECESET
}
