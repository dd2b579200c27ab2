//! Text helpers for rendering catalog data in the terminal.
//!
//! Titles and overviews come from a remote API, so everything is passed
//! through [`sanitize_line`] before it reaches the screen.

mod text;

pub use text::{display_width, sanitize_line, truncate_to_width};

/// Maximum accepted length of the search box, in characters.
pub const MAX_QUERY_LENGTH: usize = 256;
