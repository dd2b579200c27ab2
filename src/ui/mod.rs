//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `render` - Screen layout, search box and trending strip
//! - `results` - Result list with the trailing sentinel row
//! - `pagination` - Page footer
//! - `status` - Status bar widget

mod input;
mod loop_runner;
mod pagination;
mod render;
mod results;
mod status;

pub use loop_runner::{run, Action};
