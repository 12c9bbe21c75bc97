pub mod animation;
pub mod component;
pub mod config;
pub mod controlled;
pub mod engine;
pub mod error;
pub mod game;
pub mod geometry;
pub mod interaction;
pub mod markers;
pub mod movetext;
pub mod navigation;
pub mod notation;
pub mod render;
pub mod sound;
pub mod theme;
pub mod types;

// Re-export the types hosts work with directly
pub use animation::{ANIMATION_DURATION, DebugHooks, FramePiece, MoveAnimation, PieceDelta};
pub use component::{BoardCallbacks, Chessboard, NavigationBoard, NavigationCallbacks, NavigationState};
pub use config::BoardOptions;
pub use controlled::Controlled;
pub use engine::{MoveDescriptor, MoveKind, RulesEngine, START_FEN, ShakmatyEngine};
pub use error::*;
pub use game::{Game, MAIN_VARIATION_ID, MoveNode};
pub use geometry::{AdaptedSize, BoardLayout, BoardSize, SizeOptions, SmallScreenLimit, Visibility};
pub use interaction::{BoardEvent, InteractionMode, InteractionState, PromotionChoice};
pub use markers::{AnnotationColor, Markers};
pub use movetext::{Movetext, MovetextToken};
pub use navigation::{AutoplayTimer, GameTree, NavAction, NavKey, NavigationController, NavigationEvent, PLAY_INTERVAL};
pub use notation::PieceSymbols;
pub use render::{ErrorBox, Primitive, RenderModel, RenderOutcome};
pub use sound::{MoveSound, SoundPlayer};
pub use theme::{Colorset, Rgb};
pub use types::*;
