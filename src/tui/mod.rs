//! TUI module: Terminal User Interface using Ratatui.
//!
//! One page with:
//! - The customer profile form
//! - The premium estimate and its band
//! - A sidebar with validation metrics and the model reload action

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::PremiumTheme;
