//! Application state: a navigation board over a PGN game plus a side panel

use std::fmt;
use std::path::PathBuf;

use chessboard::markers::{flatten_arrow_markers, ArrowMarkerSet, MarkerSpec};
use chessboard::theme::COLORSETS;
use chessboard::{
    BoardEvent, BoardOptions, ErrorBox, Game, InteractionMode, Movetext, MovetextToken, NavAction,
    NavKey, NavigationBoard, NavigationCallbacks, NavigationState, PieceSymbols, ShakmatyEngine, SizeOptions,
};
use iced::keyboard::{self, key::Named, Key};
use iced::widget::{
    button, canvas, column, container, horizontal_rule, pick_list, row, scrollable, text, text_input, vertical_space,
};
use iced::{window, Element, Font, Length, Subscription, Task, Theme};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::board::{BoardCanvas, PointerMessage};
use crate::styles::{self, BOARD_PADDING, PANEL_WIDTH, WINDOW_SIZE};

/// Files named on the command line.
#[derive(Debug, Clone, Default)]
pub struct Launch {
    pub pgn: Option<PathBuf>,
    pub options: Option<PathBuf>,
}

impl Launch {
    /// `chessboard_gui [--options board.toml] [game.pgn]`
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Self {
        let mut launch = Launch::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--options" => launch.options = args.next().map(PathBuf::from),
                _ => launch.pgn = Some(PathBuf::from(arg)),
            }
        }
        launch
    }
}

/// Interaction mode as listed in the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChoice(InteractionMode);

impl ModeChoice {
    const ALL: [ModeChoice; 5] = [
        ModeChoice(InteractionMode::None),
        ModeChoice(InteractionMode::PlayMoves),
        ModeChoice(InteractionMode::MovePieces),
        ModeChoice(InteractionMode::ClickSquares),
        ModeChoice(InteractionMode::EditArrows),
    ];
}

impl fmt::Display for ModeChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.0 {
            InteractionMode::None => "View only",
            InteractionMode::PlayMoves => "Play moves",
            InteractionMode::MovePieces => "Move pieces",
            InteractionMode::ClickSquares => "Click squares",
            InteractionMode::EditArrows => "Edit arrows",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolChoice {
    #[default]
    English,
    French,
    German,
    Figurines,
}

impl SymbolChoice {
    const ALL: [SymbolChoice; 4] = [
        SymbolChoice::English,
        SymbolChoice::French,
        SymbolChoice::German,
        SymbolChoice::Figurines,
    ];

    fn symbols(self) -> PieceSymbols {
        match self {
            SymbolChoice::English => PieceSymbols::Native,
            SymbolChoice::French => PieceSymbols::french(),
            SymbolChoice::German => PieceSymbols::german(),
            SymbolChoice::Figurines => PieceSymbols::Figurines,
        }
    }
}

impl fmt::Display for SymbolChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SymbolChoice::English => "English letters",
            SymbolChoice::French => "French letters",
            SymbolChoice::German => "German letters",
            SymbolChoice::Figurines => "Figurines",
        };
        write!(f, "{label}")
    }
}

/// Application messages
#[derive(Debug, Clone)]
pub enum Message {
    // Board
    Pointer(PointerMessage),
    Frame,
    Resized(iced::Size),

    // Navigation
    Nav(NavAction),
    Key(NavKey),
    GoTo(String),
    AutoplayDue(u64),

    // Files
    PathChanged(String),
    LoadPgn,
    PgnLoaded(Result<String, String>),
    OptionsLoaded(Result<String, String>),

    // Panel settings
    ColorsetSelected(String),
    ModeSelected(ModeChoice),
    SymbolsSelected(SymbolChoice),
}

pub struct BoardApp {
    nav: NavigationBoard<ShakmatyEngine>,
    options: BoardOptions,
    options_path: Option<PathBuf>,
    arrows: ArrowMarkerSet,
    symbols: SymbolChoice,
    pgn_path: String,
    status: String,
    load_error: Option<ErrorBox>,
    /// Generation of the autoplay tick a task is already waiting for.
    armed: Option<u64>,
}

impl BoardApp {
    pub fn new(launch: Launch) -> (Self, Task<Message>) {
        let options = BoardOptions {
            interaction_mode: InteractionMode::PlayMoves,
            animated: true,
            ..BoardOptions::default()
        };
        let now = Instant::now();
        let nav = new_navigation(Game::new(ShakmatyEngine::new()), options.clone(), now);
        let mut app = Self {
            nav,
            options,
            options_path: launch.options.clone(),
            arrows: ArrowMarkerSet::new(),
            symbols: SymbolChoice::default(),
            pgn_path: launch
                .pgn
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            status: "New game".to_string(),
            load_error: None,
            armed: None,
        };
        app.fit_to(iced::Size::new(WINDOW_SIZE.0, WINDOW_SIZE.1), now);

        let mut tasks = Vec::new();
        if let Some(path) = launch.options {
            tasks.push(Task::perform(read_file(path), Message::OptionsLoaded));
        }
        if launch.pgn.is_some() {
            tasks.push(app.load_pgn());
        }
        (app, Task::batch(tasks))
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let keys = keyboard::on_key_press(|key, _modifiers| {
            let nav_key = match key {
                Key::Named(Named::Home) => NavKey::Home,
                Key::Named(Named::ArrowLeft) => NavKey::Left,
                Key::Named(Named::ArrowRight) => NavKey::Right,
                Key::Named(Named::End) => NavKey::End,
                _ => return None,
            };
            Some(Message::Key(nav_key))
        });
        let resizes = window::resize_events().map(|(_id, size)| Message::Resized(size));
        let mut subscriptions = vec![keys, resizes];
        if self.nav.board().is_animating(Instant::now()) {
            subscriptions.push(window::frames().map(|_| Message::Frame));
        }
        Subscription::batch(subscriptions)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        let now = Instant::now();
        match message {
            Message::Pointer(pointer) => self.handle_pointer(pointer, now),
            Message::Frame => {}
            Message::Resized(size) => self.fit_to(size, now),

            Message::Nav(action) => {
                self.nav.handle(action, now);
            }
            Message::Key(key) => {
                self.nav.handle_key(key, now);
            }
            Message::GoTo(node_id) => {
                self.nav.go_to(&node_id, now);
            }
            Message::AutoplayDue(generation) => {
                self.armed = None;
                self.nav.tick(generation, now);
            }

            Message::PathChanged(path) => self.pgn_path = path,
            Message::LoadPgn => return self.load_pgn(),
            Message::PgnLoaded(Ok(pgn)) => self.open_pgn(&pgn, now),
            Message::PgnLoaded(Err(err)) | Message::OptionsLoaded(Err(err)) => {
                warn!(%err, "could not read file");
                self.status = err;
            }
            Message::OptionsLoaded(Ok(contents)) => self.apply_options_file(&contents, now),

            Message::ColorsetSelected(name) => {
                self.options.colorset = name;
                self.push_options(now);
            }
            Message::ModeSelected(ModeChoice(mode)) => {
                self.options.interaction_mode = mode;
                self.push_options(now);
            }
            Message::SymbolsSelected(symbols) => self.symbols = symbols,
        }
        self.arm_autoplay()
    }

    fn handle_pointer(&mut self, pointer: PointerMessage, now: Instant) {
        let board = self.nav.board_mut();
        let event = match pointer {
            PointerMessage::Down(at) => board.pointer_down(at),
            PointerMessage::Up(at) => board.pointer_up(at),
            PointerMessage::Move(at) => {
                board.pointer_move(at);
                None
            }
            PointerMessage::Cancel => {
                board.pointer_cancel();
                None
            }
        };
        match event {
            Some(BoardEvent::MovePlayed(san)) => match self.nav.play_move(&san, now) {
                Ok(node_id) => self.status = format!("Played {san} ({node_id})"),
                Err(err) => self.status = err.to_string(),
            },
            Some(BoardEvent::PieceMoved { from, to }) => self.status = format!("Piece moved {from} to {to}"),
            Some(BoardEvent::SquareClicked(square)) => self.status = format!("Clicked {square}"),
            Some(BoardEvent::ArrowEdited { vector, color }) => {
                if self.arrows.get(&vector) == Some(&color) {
                    self.arrows.remove(&vector);
                } else {
                    self.arrows.insert(vector, color);
                }
                self.options.arrow_markers = MarkerSpec::Notation(flatten_arrow_markers(&self.arrows));
                self.push_options(now);
            }
            None => {}
        }
    }

    /// Waits for the next autoplay deadline in a task unless one already does.
    fn arm_autoplay(&mut self) -> Task<Message> {
        let timer = self.nav.timer();
        let (Some(deadline), generation) = (timer.deadline(), timer.generation()) else {
            return Task::none();
        };
        if self.armed == Some(generation) {
            return Task::none();
        }
        self.armed = Some(generation);
        Task::perform(tokio::time::sleep_until(deadline), move |()| Message::AutoplayDue(generation))
    }

    /// Picks the largest square size for which the board and its toolbar fit
    /// next to the side panel.
    fn fit_to(&mut self, window: iced::Size, now: Instant) {
        let width = (window.width - PANEL_WIDTH - 2.0 * BOARD_PADDING).max(0.0);
        let height = (window.height - 2.0 * BOARD_PADDING).max(0.0);
        let viewport = (window.width - PANEL_WIDTH).max(0.0) as u32;
        let sizing = SizeOptions::new(self.options.coordinate_visible, self.options.turn_visible)
            .with_small_screen_limits(self.options.small_screen_limits.clone(), viewport);
        match NavigationBoard::<ShakmatyEngine>::adapt_square_size(f64::from(width), f64::from(height), &sizing) {
            Ok(adapted) => {
                debug!(square_size = adapted.square_size, "board resized");
                self.options.square_size = adapted.square_size;
                self.nav.board_mut().set_viewport_width(Some(viewport), now);
                self.push_options(now);
            }
            Err(err) => warn!(%err, "could not size the board"),
        }
    }

    fn push_options(&mut self, now: Instant) {
        let mut options = self.options.clone();
        options.flipped = self.nav.is_flipped();
        if let Err(err) = self.nav.board_mut().set_options(options, now) {
            warn!(%err, "board options rejected");
            self.status = err.to_string();
        }
    }

    fn load_pgn(&mut self) -> Task<Message> {
        let path = PathBuf::from(self.pgn_path.trim());
        self.status = format!("Loading {}", path.display());
        Task::perform(read_file(path), Message::PgnLoaded)
    }

    fn open_pgn(&mut self, pgn: &str, now: Instant) {
        match Game::parse(ShakmatyEngine::new(), pgn) {
            Ok(game) => {
                info!(headers = game.headers().len(), "game loaded");
                self.status = game_title(&game);
                self.load_error = None;
                self.armed = None;
                self.nav = new_navigation(game, self.options.clone(), now);
            }
            Err(err) => {
                debug!(%err, "invalid PGN");
                self.status = "Invalid PGN".to_string();
                self.load_error = Some(ErrorBox::from_notation("Invalid PGN", &err, pgn));
            }
        }
    }

    fn apply_options_file(&mut self, contents: &str, now: Instant) {
        let is_json = self
            .options_path
            .as_ref()
            .and_then(|p| p.extension())
            .is_some_and(|ext| ext == "json");
        let parsed = if is_json {
            serde_json::from_str::<serde_json::Value>(contents)
                .map_err(chessboard::BoardError::from)
                .and_then(|value| BoardOptions::from_json_value(&value))
        } else {
            BoardOptions::from_toml_str(contents)
        };
        match parsed {
            Ok(options) => {
                self.arrows = options.arrow_markers.arrow_markers();
                self.options = options;
                self.push_options(now);
                self.status = "Options loaded".to_string();
            }
            Err(err) => {
                warn!(%err, "invalid board options");
                self.status = err.to_string();
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let board_view: Element<'_, Message> = match self.nav.board().outcome() {
            chessboard::RenderOutcome::Board(model) => {
                let now = Instant::now();
                let board = self.nav.board();
                let program = BoardCanvas {
                    model,
                    animation: board.animation_frame(now),
                    dragged: board.dragged_piece(),
                    drag_origin: board.drag_origin(),
                    selected: board.selected_square(),
                    promotion: board.promotion(),
                };
                let board_canvas: Element<'_, PointerMessage> = canvas(program)
                    .width(model.size.width as f32)
                    .height(model.size.height as f32)
                    .into();
                board_canvas.map(Message::Pointer)
            }
            chessboard::RenderOutcome::Error(error) => error_view(error),
        };

        let play_label = if self.nav.is_playing() { "Pause" } else { "Play" };
        let toolbar = row![
            nav_button("|<", NavAction::First),
            nav_button("<", NavAction::Previous),
            nav_button(play_label, NavAction::TogglePlay),
            nav_button(">", NavAction::Next),
            nav_button(">|", NavAction::Last),
            nav_button("Flip", NavAction::Flip),
        ]
        .spacing(4);

        row![
            container(column![board_view, toolbar]).padding(BOARD_PADDING),
            container(self.panel())
                .width(PANEL_WIDTH)
                .height(Length::Fill)
                .padding(15),
        ]
        .spacing(10)
        .into()
    }

    fn panel(&self) -> Element<'_, Message> {
        let file_row = row![
            text_input("game.pgn", &self.pgn_path)
                .on_input(Message::PathChanged)
                .on_submit(Message::LoadPgn),
            button(text("Load")).on_press(Message::LoadPgn).style(button::primary),
        ]
        .spacing(5);

        let colorsets: Vec<String> = COLORSETS.iter().map(|c| c.name.to_string()).collect();
        let colorset_picker = pick_list(colorsets, Some(self.options.colorset.clone()), Message::ColorsetSelected)
            .width(Length::Fill);
        let mode_picker = pick_list(
            ModeChoice::ALL,
            Some(ModeChoice(self.options.interaction_mode)),
            Message::ModeSelected,
        )
        .width(Length::Fill);
        let symbol_picker = pick_list(SymbolChoice::ALL, Some(self.symbols), Message::SymbolsSelected)
            .width(Length::Fill);

        let mut content = column![
            file_row,
            vertical_space().height(10),
            text("Colorset").size(14),
            colorset_picker,
            text("Interaction").size(14),
            mode_picker,
            text("Move notation").size(14),
            symbol_picker,
            vertical_space().height(10),
            horizontal_rule(1),
            text(&self.status).size(15),
        ]
        .spacing(5);

        if let Some(error) = &self.load_error {
            content = content.push(error_view(error));
        }

        content
            .push(horizontal_rule(1))
            .push(scrollable(self.movetext_view()).height(Length::Fill))
            .into()
    }

    fn movetext_view(&self) -> Element<'_, Message> {
        let movetext = Movetext::build(self.nav.game(), Some(self.nav.node_id()), &self.symbols.symbols());
        let mut line = row![].spacing(4);
        for token in movetext.tokens {
            let label = token.text();
            let item: Element<'_, Message> = match token {
                MovetextToken::Move { node_id, selected, .. } => button(text(label).size(13))
                    .padding([1, 3])
                    .style(if selected { button::primary } else { button::text })
                    .on_press(Message::GoTo(node_id))
                    .into(),
                MovetextToken::Comment(_) => text(label).size(12).color(styles::LABEL).into(),
                _ => text(label).size(13).into(),
            };
            line = line.push(item);
        }
        line.wrap().into()
    }
}

fn new_navigation(
    game: Game<ShakmatyEngine>,
    options: BoardOptions,
    now: Instant,
) -> NavigationBoard<ShakmatyEngine> {
    NavigationBoard::new(
        game,
        options,
        NavigationState::default(),
        NavigationCallbacks::default(),
        now,
    )
}

fn game_title(game: &Game<ShakmatyEngine>) -> String {
    match (game.header("White"), game.header("Black")) {
        (Some(white), Some(black)) => format!("{white} - {black}"),
        _ => "Game loaded".to_string(),
    }
}

async fn read_file(path: PathBuf) -> Result<String, String> {
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|err| format!("{}: {err}", path.display()))
}

fn nav_button(label: &str, action: NavAction) -> Element<'static, Message> {
    button(text(label.to_string()).size(14))
        .on_press(Message::Nav(action))
        .style(button::secondary)
        .into()
}

fn error_view(error: &ErrorBox) -> Element<'_, Message> {
    let mut content = column![
        text(&error.title).size(18).color(styles::ERROR_TITLE),
        text(&error.message).size(14),
    ]
    .spacing(4);
    if let Some(line) = error.line {
        content = content.push(text(format!("line {line}")).size(12));
    }
    if let Some(excerpt) = &error.excerpt {
        content = content.push(text(excerpt).font(Font::MONOSPACE).size(13));
        if let Some(caret) = error.caret {
            content = content.push(text(format!("{}^", " ".repeat(caret))).font(Font::MONOSPACE).size(13));
        }
    }
    container(content).padding(10).into()
}
