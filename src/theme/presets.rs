//! Palette presets.
//!
//! - terminal (default - uses ANSI colors)
//! - dracula
//! - nord
//! - gruvbox

use super::Palette;
use crate::style::Color;

/// Terminal palette - ANSI colors so the user's terminal theme is respected.
pub fn terminal() -> Palette {
    Palette {
        name: "terminal",
        text: Color::Default,
        muted: Color::Named(8),
        accent: Color::Named(12), // bright blue
        success: Color::Named(2),
        error: Color::Named(1),
        background: Color::Default,
        surface: Color::Default,
        border: Color::Named(7),
        border_focus: Color::Named(12),
        status_fg: Color::Named(0),
        status_bg: Color::Named(7),
    }
}

/// Dracula - dark theme with vivid colors.
pub fn dracula() -> Palette {
    Palette {
        name: "dracula",
        text: Color::from_rgb_int(0xf8f8f2),
        muted: Color::from_rgb_int(0x6272a4),
        accent: Color::from_rgb_int(0xbd93f9), // purple
        success: Color::from_rgb_int(0x50fa7b),
        error: Color::from_rgb_int(0xff5555),
        background: Color::from_rgb_int(0x282a36),
        surface: Color::from_rgb_int(0x44475a),
        border: Color::from_rgb_int(0x6272a4),
        border_focus: Color::from_rgb_int(0xbd93f9),
        status_fg: Color::from_rgb_int(0xf8f8f2),
        status_bg: Color::from_rgb_int(0x44475a),
    }
}

/// Nord - arctic, north-bluish palette.
pub fn nord() -> Palette {
    Palette {
        name: "nord",
        text: Color::from_rgb_int(0xd8dee9),
        muted: Color::from_rgb_int(0x4c566a),
        accent: Color::from_rgb_int(0x88c0d0), // frost cyan
        success: Color::from_rgb_int(0xa3be8c),
        error: Color::from_rgb_int(0xbf616a),
        background: Color::from_rgb_int(0x2e3440),
        surface: Color::from_rgb_int(0x434c5e),
        border: Color::from_rgb_int(0x4c566a),
        border_focus: Color::from_rgb_int(0x88c0d0),
        status_fg: Color::from_rgb_int(0xeceff4),
        status_bg: Color::from_rgb_int(0x3b4252),
    }
}

/// Gruvbox Dark.
pub fn gruvbox() -> Palette {
    Palette {
        name: "gruvbox",
        text: Color::from_rgb_int(0xebdbb2),
        muted: Color::from_rgb_int(0xa89984),
        accent: Color::from_rgb_int(0xd79921), // yellow
        success: Color::from_rgb_int(0x98971a),
        error: Color::from_rgb_int(0xcc241d),
        background: Color::from_rgb_int(0x282828),
        surface: Color::from_rgb_int(0x504945),
        border: Color::from_rgb_int(0x665c54),
        border_focus: Color::from_rgb_int(0xfe8019), // orange
        status_fg: Color::from_rgb_int(0xfbf1c7),
        status_bg: Color::from_rgb_int(0x3c3836),
    }
}

/// Get a preset palette by name (case-insensitive, `_`/`-` ignored).
pub fn get_preset(name: &str) -> Option<Palette> {
    match name.to_lowercase().replace(['_', '-'], "").as_str() {
        "terminal" => Some(terminal()),
        "dracula" => Some(dracula()),
        "nord" => Some(nord()),
        "gruvbox" => Some(gruvbox()),
        _ => None,
    }
}

/// List all available preset names.
pub fn preset_names() -> &'static [&'static str] {
    &["terminal", "dracula", "nord", "gruvbox"]
}
