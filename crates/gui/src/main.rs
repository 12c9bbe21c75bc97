//! Chessboard desktop host
//!
//! Shows a PGN game on the chessboard widget with:
//! - Move list navigation, keyboard shortcuts and autoplay
//! - Playing moves into new variations
//! - Board options loaded from a TOML or JSON file

mod app;
mod board;
mod styles;

use app::{BoardApp, Launch};
use iced::application;
use tracing_subscriber::EnvFilter;

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let launch = Launch::from_args(std::env::args().skip(1));
    application("Chessboard", BoardApp::update, BoardApp::view)
        .subscription(BoardApp::subscription)
        .theme(BoardApp::theme)
        .window_size(styles::WINDOW_SIZE)
        .run_with(move || BoardApp::new(launch))
}
