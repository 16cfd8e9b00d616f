pub mod app;
pub mod board_controls;
pub mod drawing_board;
pub mod notice_overlay;

pub use app::{App, AppProps};
