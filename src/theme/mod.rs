//! Palette - semantic colors shared through the view environment.
//!
//! Views never hard-code "the border color" or "the status bar background";
//! they read them from the [`Palette`] carried in the environment so a whole
//! application can be re-themed by swapping presets.
//!
//! # Example
//!
//! ```rust
//! use spark_view::theme::{get_preset, Palette};
//!
//! let dracula = get_preset("dracula").unwrap();
//! assert_eq!(dracula.name, "dracula");
//!
//! let fallback = Palette::default();
//! assert_eq!(fallback.name, "terminal");
//! ```

mod presets;

pub use presets::*;

use crate::style::{Color, Style};

/// Semantic color set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    // Text
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    // Semantic
    pub success: Color,
    pub error: Color,
    // Background
    pub background: Color,
    pub surface: Color,
    // Border
    pub border: Color,
    pub border_focus: Color,
    // Status region
    pub status_fg: Color,
    pub status_bg: Color,
}

impl Palette {
    /// Style for body text. Plain when the text color is the terminal default.
    pub fn text_style(&self) -> Style {
        if self.text.is_default() {
            Style::new()
        } else {
            Style::new().fg(self.text)
        }
    }

    /// Style for the fixed status region.
    pub fn status_style(&self) -> Style {
        Style::new().fg(self.status_fg).bg(self.status_bg)
    }

    /// Background control sequence used to fill output lines.
    ///
    /// Empty for the terminal default, so background persistence is a no-op.
    pub fn background_sequence(&self) -> String {
        if self.background.is_default() {
            String::new()
        } else {
            Style::new().bg(self.background).prologue()
        }
    }

    /// Copy of this palette with a different background.
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }
}

impl Default for Palette {
    fn default() -> Self {
        terminal()
    }
}

// =============================================================================
// Tests
// =============================================================================
