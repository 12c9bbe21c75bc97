//! Best-effort move sounds.

use tracing::debug;

use crate::animation::DebugHooks;
use crate::engine::{MoveDescriptor, MoveKind};
use crate::error::SoundError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveSound {
    Move,
    Capture,
    Castle,
    Promotion,
}

impl MoveSound {
    pub fn for_move(mv: &MoveDescriptor) -> MoveSound {
        if mv.promotion.is_some() {
            MoveSound::Promotion
        } else if matches!(mv.kind, MoveKind::Castle { .. }) {
            MoveSound::Castle
        } else if mv.is_capture() {
            MoveSound::Capture
        } else {
            MoveSound::Move
        }
    }
}

/// Audio output used for move sounds.
pub trait SoundPlayer {
    fn play(&mut self, sound: MoveSound) -> Result<(), SoundError>;
}

/// Plays the sound of a move if sound is enabled (or forced by the hooks).
/// Failures are logged and otherwise ignored.
pub fn play_move_sound(player: &mut dyn SoundPlayer, mv: &MoveDescriptor, enabled: bool, hooks: &DebugHooks) {
    if !hooks.sound_forced().unwrap_or(enabled) {
        return;
    }
    let sound = MoveSound::for_move(mv);
    if let Err(err) = player.play(sound) {
        debug!(%err, ?sound, "move sound failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Piece, PieceKind, Side, Square};

    #[derive(Default)]
    struct Recorder {
        played: Vec<MoveSound>,
        fail: bool,
    }

    impl SoundPlayer for Recorder {
        fn play(&mut self, sound: MoveSound) -> Result<(), SoundError> {
            if self.fail {
                return Err(SoundError::Unavailable("no device".to_string()));
            }
            self.played.push(sound);
            Ok(())
        }
    }

    fn pawn_push() -> MoveDescriptor {
        MoveDescriptor {
            from: Square::parse("e2").unwrap(),
            to: Square::parse("e4").unwrap(),
            piece: Piece::new(Side::White, PieceKind::Pawn),
            captured: None,
            promotion: None,
            kind: MoveKind::Normal,
        }
    }

    #[test]
    fn test_sound_kinds() {
        let mut mv = pawn_push();
        assert_eq!(MoveSound::for_move(&mv), MoveSound::Move);
        mv.captured = Some(Piece::new(Side::Black, PieceKind::Knight));
        assert_eq!(MoveSound::for_move(&mv), MoveSound::Capture);
        mv.promotion = Some(PieceKind::Queen);
        assert_eq!(MoveSound::for_move(&mv), MoveSound::Promotion);
    }

    #[test]
    fn test_disabled_sound_is_silent() {
        let mut recorder = Recorder::default();
        play_move_sound(&mut recorder, &pawn_push(), false, &DebugHooks::default());
        assert!(recorder.played.is_empty());
    }

    #[test]
    fn test_forced_sound_overrides_setting() {
        let mut recorder = Recorder::default();
        play_move_sound(&mut recorder, &pawn_push(), false, &DebugHooks::default().force_sound(true));
        assert_eq!(recorder.played, vec![MoveSound::Move]);
    }

    #[test]
    fn test_failures_are_swallowed() {
        let mut recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        play_move_sound(&mut recorder, &pawn_push(), true, &DebugHooks::default());
        assert!(recorder.played.is_empty());
    }
}
