//! Screen rendering.
//!
//! - **renderer**: turns the edit state into terminal escape sequences,
//!   in single-line (horizontal scrolling) or multi-line (row wrapping) mode

pub mod renderer;

pub use renderer::*;
