//! Move animation: the pieces that change between two positions, and where
//! they are drawn at a given point of the timeline.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use tokio::time::Instant;

use crate::engine::{MoveDescriptor, MoveKind};
use crate::geometry::BoardLayout;
use crate::types::{Piece, Point, Square};

pub const ANIMATION_DURATION: Duration = Duration::from_millis(200);

pub type BoardSnapshot = BTreeMap<Square, Piece>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PieceDelta {
    Slide { piece: Piece, from: Square, to: Square },
    Appear { piece: Piece, square: Square },
    Disappear { piece: Piece, square: Square },
}

pub fn compute_deltas(before: &BoardSnapshot, mv: &MoveDescriptor) -> Vec<PieceDelta> {
    let mover = before.get(&mv.from).copied().unwrap_or(mv.piece);
    let mut deltas = vec![PieceDelta::Slide {
        piece: mover,
        from: mv.from,
        to: mv.to,
    }];

    match mv.kind {
        MoveKind::Castle { rook_from, rook_to } => {
            if let Some(&rook) = before.get(&rook_from) {
                deltas.push(PieceDelta::Slide {
                    piece: rook,
                    from: rook_from,
                    to: rook_to,
                });
            }
        }
        MoveKind::EnPassant { captured_square } => {
            if let Some(&pawn) = before.get(&captured_square) {
                deltas.push(PieceDelta::Disappear {
                    piece: pawn,
                    square: captured_square,
                });
            }
        }
        MoveKind::Normal => {
            if let Some(&captured) = before.get(&mv.to) {
                deltas.push(PieceDelta::Disappear {
                    piece: captured,
                    square: mv.to,
                });
            }
        }
    }

    if let Some(kind) = mv.promotion {
        deltas.push(PieceDelta::Appear {
            piece: Piece::new(mover.side, kind),
            square: mv.to,
        });
    }
    deltas
}

/// Test seam: freezes the timeline and forces the sound switch.
///
/// Setters exist only in test builds or with the `debug-hooks` feature, so a
/// normal build can only carry the inert default.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DebugHooks {
    frozen_at: Option<f64>,
    sound_forced: Option<bool>,
}

impl DebugHooks {
    pub fn frozen_at(&self) -> Option<f64> {
        self.frozen_at
    }

    pub fn sound_forced(&self) -> Option<bool> {
        self.sound_forced
    }

    #[cfg(any(test, feature = "debug-hooks"))]
    pub fn freeze_motion(mut self, t: f64) -> Self {
        self.frozen_at = Some(t.clamp(0.0, 1.0));
        self
    }

    #[cfg(any(test, feature = "debug-hooks"))]
    pub fn force_sound(mut self, enabled: bool) -> Self {
        self.sound_forced = Some(enabled);
        self
    }
}

/// A piece drawn at an arbitrary pixel position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramePiece {
    pub piece: Piece,
    pub origin: Point,
}

#[derive(Clone, Debug)]
pub struct MoveAnimation {
    before: BoardSnapshot,
    deltas: Vec<PieceDelta>,
    started_at: Instant,
    duration: Duration,
    hooks: DebugHooks,
}

impl MoveAnimation {
    pub fn new(before: BoardSnapshot, mv: &MoveDescriptor, started_at: Instant) -> Self {
        let deltas = compute_deltas(&before, mv);
        Self {
            before,
            deltas,
            started_at,
            duration: ANIMATION_DURATION,
            hooks: DebugHooks::default(),
        }
    }

    pub fn with_hooks(mut self, hooks: DebugHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn deltas(&self) -> &[PieceDelta] {
        &self.deltas
    }

    /// Timeline position in `0.0..=1.0`, non-decreasing in `now`.
    pub fn progress(&self, now: Instant) -> f64 {
        if let Some(t) = self.hooks.frozen_at {
            return t;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// Pieces to draw at timeline position `t`.
    pub fn frame(&self, t: f64, layout: &BoardLayout) -> Vec<FramePiece> {
        let t = t.clamp(0.0, 1.0);
        let mut vacated = BTreeSet::new();
        let mut slide_targets = BTreeSet::new();
        for delta in &self.deltas {
            match *delta {
                PieceDelta::Slide { from, to, .. } => {
                    vacated.insert(from);
                    slide_targets.insert(to);
                }
                PieceDelta::Disappear { square, .. } => {
                    vacated.insert(square);
                }
                PieceDelta::Appear { .. } => {}
            }
        }
        let replaced: BTreeSet<Square> = self
            .deltas
            .iter()
            .filter_map(|d| match *d {
                PieceDelta::Appear { square, .. } if slide_targets.contains(&square) => Some(square),
                _ => None,
            })
            .collect();

        let mut pieces: Vec<FramePiece> = self
            .before
            .iter()
            .filter(|(square, _)| !vacated.contains(*square))
            .map(|(&square, &piece)| FramePiece {
                piece,
                origin: layout.square_origin(square),
            })
            .collect();

        // Captured pieces go underneath the moving ones.
        let (leaving, moving): (Vec<&PieceDelta>, Vec<&PieceDelta>) = self
            .deltas
            .iter()
            .partition(|d| matches!(d, PieceDelta::Disappear { .. }));
        for delta in leaving.into_iter().chain(moving) {
            match *delta {
                PieceDelta::Disappear { piece, square } => {
                    if t < 1.0 {
                        pieces.push(FramePiece {
                            piece,
                            origin: layout.square_origin(square),
                        });
                    }
                }
                PieceDelta::Slide { piece, from, to } => {
                    if t >= 1.0 && replaced.contains(&to) {
                        continue;
                    }
                    pieces.push(FramePiece {
                        piece,
                        origin: layout.square_origin(from).lerp(layout.square_origin(to), t),
                    });
                }
                PieceDelta::Appear { piece, square } => {
                    if t >= 1.0 || !replaced.contains(&square) {
                        pieces.push(FramePiece {
                            piece,
                            origin: layout.square_origin(square),
                        });
                    }
                }
            }
        }
        pieces
    }
}

#[cfg(test)]
#[path = "animation_tests.rs"]
mod animation_tests;
