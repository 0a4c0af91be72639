//! Terminal UI
//!
//! `ChatApp` is the widget state (message thread, indicators, banner,
//! toast, processing overlay); `view` renders it. The state is plain data
//! so every transition is testable without a terminal.

mod app;
mod view;

pub use app::{ChatApp, Indicator};
pub use view::draw;
