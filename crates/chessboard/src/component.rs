//! Host-facing components: a single board, and a board navigating a game.

use tokio::time::Instant;
use tracing::{debug, trace};

use crate::animation::{BoardSnapshot, DebugHooks, FramePiece, MoveAnimation};
use crate::config::BoardOptions;
use crate::controlled::Controlled;
use crate::engine::RulesEngine;
use crate::error::{BoardError, NotationError};
use crate::game::{Game, MAIN_VARIATION_ID};
use crate::geometry::{
    self, AdaptedSize, BoardLayout, BoardSize, Panels, SizeOptions, Visibility, apply_small_screen_limits,
};
use crate::interaction::{BoardEvent, EngineQuery, InteractionMachine, PromotionChoice};
use crate::markers::{AnnotationColor, Markers};
use crate::navigation::{AutoplayTimer, GameTree, NavAction, NavKey, NavigationController, NavigationEvent};
use crate::render::{PositionSource, RenderOutcome, RenderRequest, render};
use crate::sound::{SoundPlayer, play_move_sound};
use crate::types::{Piece, Point, Square, Vector};

#[derive(Default)]
pub struct BoardCallbacks {
    pub on_square_clicked: Option<Box<dyn FnMut(Square)>>,
    pub on_piece_moved: Option<Box<dyn FnMut(Square, Square)>>,
    pub on_arrow_edited: Option<Box<dyn FnMut(Vector, AnnotationColor)>>,
    pub on_move_played: Option<Box<dyn FnMut(&str)>>,
}

impl BoardCallbacks {
    fn dispatch(&mut self, event: &BoardEvent) {
        match event {
            BoardEvent::SquareClicked(square) => {
                if let Some(callback) = self.on_square_clicked.as_mut() {
                    callback(*square);
                }
            }
            BoardEvent::PieceMoved { from, to } => {
                if let Some(callback) = self.on_piece_moved.as_mut() {
                    callback(*from, *to);
                }
            }
            BoardEvent::ArrowEdited { vector, color } => {
                if let Some(callback) = self.on_arrow_edited.as_mut() {
                    callback(*vector, *color);
                }
            }
            BoardEvent::MovePlayed(san) => {
                if let Some(callback) = self.on_move_played.as_mut() {
                    callback(san);
                }
            }
        }
    }
}

/// Position shown by a board when it does not come from its options.
struct Override<P> {
    key: String,
    position: P,
    move_notation: Option<String>,
}

/// One interactive board.
pub struct Chessboard<E: RulesEngine> {
    engine: E,
    options: BoardOptions,
    markers: Markers,
    callbacks: BoardCallbacks,
    interaction: InteractionMachine,
    viewport_width: Option<u32>,
    shown: Option<Override<E::Position>>,
    outcome: RenderOutcome<E::Position>,
    displayed_key: String,
    /// Pieces of the position currently on screen.
    displayed_pieces: Option<BoardSnapshot>,
    animation: Option<MoveAnimation>,
    hooks: DebugHooks,
    sound: Option<Box<dyn SoundPlayer>>,
    sound_enabled: bool,
}

impl<E: RulesEngine> Chessboard<E> {
    /// Out-of-range options are clamped (see [`BoardOptions::sanitized`]);
    /// use [`BoardOptions::validate`] first to reject them instead.
    pub fn new(engine: E, options: BoardOptions) -> Self {
        let options = options.sanitized();
        let interaction = InteractionMachine::new(options.interaction_mode, options.edited_arrow_color);
        let markers = options.markers();
        let outcome = render_with(&engine, &options, &markers, None, None);
        let displayed_key = options_key(&options);
        let displayed_pieces = outcome.board().map(|model| snapshot(&engine, &model.position));
        Self {
            engine,
            options,
            markers,
            callbacks: BoardCallbacks::default(),
            interaction,
            viewport_width: None,
            shown: None,
            outcome,
            displayed_key,
            displayed_pieces,
            animation: None,
            hooks: DebugHooks::default(),
            sound: None,
            sound_enabled: false,
        }
    }

    pub fn with_callbacks(mut self, callbacks: BoardCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_sound(mut self, player: Box<dyn SoundPlayer>, enabled: bool) -> Self {
        self.sound = Some(player);
        self.sound_enabled = enabled;
        self
    }

    pub fn with_hooks(mut self, hooks: DebugHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Pixel size of a board with the given square size and decorations.
    pub fn size(square_size: u32, coordinate_visible: bool, turn_visible: bool) -> Result<BoardSize, BoardError> {
        geometry::validate_square_size(square_size)?;
        Ok(geometry::compute_size(square_size, coordinate_visible, turn_visible))
    }

    /// Largest square size fitting the available rectangle.
    pub fn adapt_square_size(
        available_width: f64,
        available_height: f64,
        options: &SizeOptions,
    ) -> Result<AdaptedSize, BoardError> {
        geometry::adapt_square_size(available_width, available_height, options, &Panels::none())
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn options(&self) -> &BoardOptions {
        &self.options
    }

    pub fn outcome(&self) -> &RenderOutcome<E::Position> {
        &self.outcome
    }

    pub fn layout(&self) -> Option<&BoardLayout> {
        self.outcome.board().map(|model| &model.layout)
    }

    /// Replaces the options and re-renders. A changed `move` starts an
    /// animation when `animated` is set. Invalid options are rejected and the
    /// current ones kept.
    pub fn set_options(&mut self, options: BoardOptions, now: Instant) -> Result<(), BoardError> {
        options.validate()?;
        self.interaction.set_mode(options.interaction_mode);
        self.interaction.set_arrow_color(options.edited_arrow_color);
        self.markers = options.markers();
        self.options = options;
        self.refresh(now);
        Ok(())
    }

    /// Shows an already parsed position (and optional move played from it)
    /// instead of the one in the options. `key` identifies what is shown.
    pub fn show_position(
        &mut self,
        key: impl Into<String>,
        position: E::Position,
        move_notation: Option<String>,
        now: Instant,
    ) {
        self.shown = Some(Override {
            key: key.into(),
            position,
            move_notation,
        });
        self.refresh(now);
    }

    pub fn set_flipped(&mut self, flipped: bool, now: Instant) {
        if self.options.flipped != flipped {
            self.options.flipped = flipped;
            self.refresh(now);
        }
    }

    /// Viewport width used to pick a small-screen limit.
    pub fn set_viewport_width(&mut self, width: Option<u32>, now: Instant) {
        if self.viewport_width != width {
            self.viewport_width = width;
            self.refresh(now);
        }
    }

    fn refresh(&mut self, now: Instant) {
        let (square_size, visibility) = apply_small_screen_limits(
            self.options.square_size,
            self.options.visibility(),
            &self.options.small_screen_limits,
            self.viewport_width,
        );
        let mut options = self.options.clone();
        options.square_size = square_size;
        options.coordinate_visible = visibility.coordinate_visible;
        options.turn_visible = visibility.turn_visible;

        let (outcome, key) = match &self.shown {
            Some(shown) => (
                render_with(
                    &self.engine,
                    &options,
                    &self.markers,
                    Some(&shown.position),
                    Some(shown.move_notation.as_deref()),
                ),
                shown.key.clone(),
            ),
            None => (
                render_with(&self.engine, &options, &self.markers, None, None),
                options_key(&self.options),
            ),
        };

        let changed = key != self.displayed_key;
        self.displayed_key = key;
        self.outcome = outcome;
        let previous = self.displayed_pieces.take();
        self.displayed_pieces = self.outcome.board().map(|model| snapshot(&self.engine, &model.position));
        if !changed {
            return;
        }
        self.animation = None;
        let Some(model) = self.outcome.board() else {
            return;
        };
        let (Some(mv), Some(before)) = (model.played_move, model.position_before.as_ref()) else {
            return;
        };
        // Only a move played from the position on screen is animated; jumps
        // and backward steps just show the new position.
        let before = snapshot(&self.engine, before);
        if previous.as_ref() != Some(&before) {
            trace!(mv = %mv.uci(), "move does not continue the displayed position");
            return;
        }
        if let Some(player) = self.sound.as_deref_mut() {
            play_move_sound(player, &mv, self.sound_enabled, &self.hooks);
        }
        if self.options.animated {
            debug!(mv = %mv.uci(), "starting move animation");
            self.animation = Some(MoveAnimation::new(before, &mv, now).with_hooks(self.hooks));
        }
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.animation.as_ref().is_some_and(|a| !a.is_finished(now))
    }

    /// Pieces to draw while an animation runs; `None` once it is over.
    pub fn animation_frame(&self, now: Instant) -> Option<Vec<FramePiece>> {
        let animation = self.animation.as_ref()?;
        let layout = self.layout()?;
        if animation.is_finished(now) {
            return None;
        }
        Some(animation.frame(animation.progress(now), layout))
    }

    pub fn pointer_down(&mut self, point: Point) -> Option<BoardEvent> {
        let model = self.outcome.board()?;
        let query = EngineQuery::new(&self.engine, &model.position);
        let event = self.interaction.pointer_down(point, &model.layout, &query);
        self.emit(event)
    }

    pub fn pointer_move(&mut self, point: Point) {
        self.interaction.pointer_move(point);
    }

    pub fn pointer_up(&mut self, point: Point) -> Option<BoardEvent> {
        let model = self.outcome.board()?;
        let query = EngineQuery::new(&self.engine, &model.position);
        let event = self.interaction.pointer_up(point, &model.layout, &query);
        self.emit(event)
    }

    pub fn pointer_cancel(&mut self) {
        trace!("pointer cancelled");
        self.interaction.cancel();
    }

    fn emit(&mut self, event: Option<BoardEvent>) -> Option<BoardEvent> {
        if let Some(event) = &event {
            debug!(?event, "board event");
            self.callbacks.dispatch(event);
        }
        event
    }

    pub fn dragged_piece(&self) -> Option<(Piece, Point)> {
        self.interaction.dragged_piece()
    }

    pub fn drag_origin(&self) -> Option<Square> {
        self.interaction.drag_origin()
    }

    pub fn selected_square(&self) -> Option<Square> {
        self.interaction.selected_square()
    }

    pub fn promotion(&self) -> Option<&PromotionChoice> {
        self.interaction.promotion()
    }
}

fn snapshot<E: RulesEngine>(engine: &E, position: &E::Position) -> BoardSnapshot {
    engine.pieces(position).into_iter().collect()
}

fn options_key(options: &BoardOptions) -> String {
    match &options.move_notation {
        Some(mv) => format!("{} | {mv}", options.fen()),
        None => options.fen().to_string(),
    }
}

fn render_with<E: RulesEngine>(
    engine: &E,
    options: &BoardOptions,
    markers: &Markers,
    position: Option<&E::Position>,
    move_notation: Option<Option<&str>>,
) -> RenderOutcome<E::Position> {
    let request = RenderRequest {
        position: match position {
            Some(position) => PositionSource::Parsed(position),
            None => PositionSource::Fen(options.fen()),
        },
        move_notation: move_notation.unwrap_or(options.move_notation.as_deref()),
        square_size: options.square_size,
        visibility: options.visibility(),
        flipped: options.flipped,
        move_arrow_visible: options.move_arrow_visible,
        move_arrow_color: options.move_arrow_color,
        markers,
        colorset: &options.colorset,
        pieceset: &options.pieceset,
    };
    render(engine, &request)
}

#[derive(Default)]
pub struct NavigationCallbacks {
    pub on_node_id_changed: Option<Box<dyn FnMut(&str)>>,
    pub on_flipped_changed: Option<Box<dyn FnMut(bool)>>,
    pub on_is_playing_changed: Option<Box<dyn FnMut(bool)>>,
}

/// Initial navigation state. A value paired with its callback is controlled
/// by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub node_id: Option<String>,
    pub playing: Option<bool>,
    pub flipped: Option<bool>,
}

pub const NAVIGATION_TOOLBAR_MIN_HEIGHT: u32 = 32;

/// The toolbar below a navigation board (first, previous, play, next, last
/// and flip buttons). It spans the board width.
pub fn navigation_toolbar_extent(square_size: u32, _visibility: Visibility) -> BoardSize {
    BoardSize::new(0, (square_size.saturating_mul(3) / 4).max(NAVIGATION_TOOLBAR_MIN_HEIGHT))
}

/// A board showing one node of a game, with navigation and autoplay.
pub struct NavigationBoard<E: RulesEngine + Clone> {
    game: Game<E>,
    controller: NavigationController,
    board: Chessboard<E>,
    callbacks: NavigationCallbacks,
}

impl<E: RulesEngine + Clone> NavigationBoard<E> {
    pub fn new(
        game: Game<E>,
        options: BoardOptions,
        state: NavigationState,
        callbacks: NavigationCallbacks,
        now: Instant,
    ) -> Self {
        let flipped_default = options.flipped;
        let controller = NavigationController::new(
            Controlled::resolve(
                state.node_id,
                callbacks.on_node_id_changed.is_some(),
                MAIN_VARIATION_ID.to_string(),
            ),
            Controlled::resolve(state.playing, callbacks.on_is_playing_changed.is_some(), false),
            Controlled::resolve(state.flipped, callbacks.on_flipped_changed.is_some(), flipped_default),
        );
        let board = Chessboard::new(game.engine().clone(), options);
        let mut nav = Self {
            game,
            controller,
            board,
            callbacks,
        };
        let events = nav.controller.start(&nav.game, now);
        nav.apply(events, now);
        nav
    }

    /// Pixel size of the board together with its toolbar.
    pub fn size(square_size: u32, coordinate_visible: bool, turn_visible: bool) -> Result<BoardSize, BoardError> {
        geometry::validate_square_size(square_size)?;
        Ok(geometry::compute_size_with_panels(
            square_size,
            Visibility::new(coordinate_visible, turn_visible),
            &Panels::bottom(&navigation_toolbar_extent),
        ))
    }

    /// Largest square size for which the board and its toolbar fit.
    pub fn adapt_square_size(
        available_width: f64,
        available_height: f64,
        options: &SizeOptions,
    ) -> Result<AdaptedSize, BoardError> {
        geometry::adapt_square_size(
            available_width,
            available_height,
            options,
            &Panels::bottom(&navigation_toolbar_extent),
        )
    }

    pub fn game(&self) -> &Game<E> {
        &self.game
    }

    pub fn board(&self) -> &Chessboard<E> {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Chessboard<E> {
        &mut self.board
    }

    pub fn node_id(&self) -> &str {
        self.controller.node_id()
    }

    pub fn is_playing(&self) -> bool {
        self.controller.is_playing()
    }

    pub fn is_flipped(&self) -> bool {
        self.controller.is_flipped()
    }

    pub fn timer(&self) -> &AutoplayTimer {
        self.controller.timer()
    }

    pub fn handle(&mut self, action: NavAction, now: Instant) -> Vec<NavigationEvent> {
        let events = self.controller.handle(&self.game, action, now);
        self.apply(events, now)
    }

    pub fn handle_key(&mut self, key: NavKey, now: Instant) -> Vec<NavigationEvent> {
        self.handle(key.action(), now)
    }

    pub fn poll(&mut self, now: Instant) -> Vec<NavigationEvent> {
        let events = self.controller.poll(&self.game, now);
        self.apply(events, now)
    }

    pub fn tick(&mut self, generation: u64, now: Instant) -> Vec<NavigationEvent> {
        let events = self.controller.tick(&self.game, generation, now);
        self.apply(events, now)
    }

    /// Values pushed by the host for its controlled state.
    pub fn sync(&mut self, state: NavigationState, now: Instant) -> Vec<NavigationEvent> {
        let events = self
            .controller
            .sync(&self.game, state.node_id, state.playing, state.flipped, now);
        self.apply(events, now)
    }

    /// Plays a move from the current node. Continues the current line when
    /// it ends here, follows the existing move when it matches, and opens a
    /// new variation otherwise. Returns the id of the node played.
    pub fn play_move(&mut self, notation: &str, now: Instant) -> Result<String, NotationError> {
        let current = self.controller.node_id().to_string();
        let played = match self.game.next_in_variation(&current) {
            None => {
                let variation = self.game.variation_start(&current).unwrap_or_else(|| MAIN_VARIATION_ID.to_string());
                self.game.push_move(&variation, notation)?
            }
            Some(next) => {
                let before = self.game.position_before(&next).cloned();
                let same = match (before, self.game.move_node(&next)) {
                    (Some(before), Some(node)) => self
                        .game
                        .engine()
                        .parse_move(&before, notation)
                        .is_ok_and(|mv| mv == *node.mv),
                    _ => false,
                };
                if same {
                    next
                } else {
                    let variation = self.game.add_variation(&next)?;
                    self.game.push_move(&variation, notation)?
                }
            }
        };
        debug!(node = %played, notation, "move played on navigation board");
        self.handle_goto(played.clone(), now);
        Ok(played)
    }

    /// Jumps to any node; autoplay stops.
    pub fn go_to(&mut self, node_id: &str, now: Instant) -> Vec<NavigationEvent> {
        self.handle_goto(node_id.to_string(), now)
    }

    fn handle_goto(&mut self, node_id: String, now: Instant) -> Vec<NavigationEvent> {
        let events = self.controller.go_to(&self.game, node_id, now);
        self.apply(events, now)
    }

    fn apply(&mut self, events: Vec<NavigationEvent>, now: Instant) -> Vec<NavigationEvent> {
        for event in &events {
            match event {
                NavigationEvent::NodeIdChanged(id) => {
                    if let Some(callback) = self.callbacks.on_node_id_changed.as_mut() {
                        callback(id);
                    }
                }
                NavigationEvent::FlippedChanged(flipped) => {
                    if let Some(callback) = self.callbacks.on_flipped_changed.as_mut() {
                        callback(*flipped);
                    }
                }
                NavigationEvent::IsPlayingChanged(playing) => {
                    if let Some(callback) = self.callbacks.on_is_playing_changed.as_mut() {
                        callback(*playing);
                    }
                }
            }
        }
        self.show_current(now);
        events
    }

    fn show_current(&mut self, now: Instant) {
        let node_id = self.controller.node_id().to_string();
        self.board.set_flipped(self.controller.is_flipped(), now);
        match (self.game.move_node(&node_id), self.game.position_before(&node_id)) {
            (Some(node), Some(before)) => {
                let notation = node.notation.to_string();
                self.board.show_position(node_id, before.clone(), Some(notation), now);
            }
            _ => match self.game.position(&node_id) {
                Some(position) => self.board.show_position(node_id, position.clone(), None, now),
                None => trace!(node = %node_id, "unknown node"),
            },
        }
    }
}

#[cfg(test)]
#[path = "component_tests.rs"]
mod component_tests;
