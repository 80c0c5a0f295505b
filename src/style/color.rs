//! Terminal colors.
//!
//! A [`Color`] is one of the three encodings terminals understand:
//!
//! - `Named(0..=15)` - the standard 8 colors plus their bright variants (SGR 30-37 / 90-97)
//! - `Indexed(n)` - the 256-color palette (SGR 38;5;n)
//! - `Rgb(r, g, b)` - TrueColor (SGR 38;2;r;g;b)
//!
//! `Default` leaves the choice to the terminal.

use std::fmt::Write as _;

use crate::error::Error;

// =============================================================================
// Color
// =============================================================================

/// A foreground or background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Terminal default (SGR 39 / 49).
    #[default]
    Default,
    /// Standard or bright color (0-7 standard, 8-15 bright).
    Named(u8),
    /// 256-color palette index.
    Indexed(u8),
    /// TrueColor.
    Rgb(u8, u8, u8),
}

/// Names accepted by [`Color::parse`], in palette order.
const NAMES: [&str; 16] = [
    "black",
    "red",
    "green",
    "yellow",
    "blue",
    "magenta",
    "cyan",
    "white",
    "bright-black",
    "bright-red",
    "bright-green",
    "bright-yellow",
    "bright-blue",
    "bright-magenta",
    "bright-cyan",
    "bright-white",
];

impl Color {
    pub const BLACK: Self = Self::Named(0);
    pub const RED: Self = Self::Named(1);
    pub const GREEN: Self = Self::Named(2);
    pub const YELLOW: Self = Self::Named(3);
    pub const BLUE: Self = Self::Named(4);
    pub const MAGENTA: Self = Self::Named(5);
    pub const CYAN: Self = Self::Named(6);
    pub const WHITE: Self = Self::Named(7);
    pub const GRAY: Self = Self::Named(8);

    /// Create an RGB color from a `0xRRGGBB` integer.
    pub const fn from_rgb_int(value: u32) -> Self {
        Self::Rgb(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        )
    }

    /// Check if this is the terminal default color.
    #[inline]
    pub const fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// Parse a hex color: `#RGB` or `#RRGGBB` (the `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');

        fn hex_digit(c: u8) -> Option<u8> {
            match c {
                b'0'..=b'9' => Some(c - b'0'),
                b'a'..=b'f' => Some(c - b'a' + 10),
                b'A'..=b'F' => Some(c - b'A' + 10),
                _ => None,
            }
        }

        fn hex_byte(s: &[u8], i: usize) -> Option<u8> {
            let high = hex_digit(s[i])?;
            let low = hex_digit(s[i + 1])?;
            Some((high << 4) | low)
        }

        let bytes = hex.as_bytes();
        match bytes.len() {
            // #RGB -> #RRGGBB
            3 => {
                let r = hex_digit(bytes[0])?;
                let g = hex_digit(bytes[1])?;
                let b = hex_digit(bytes[2])?;
                Some(Self::Rgb((r << 4) | r, (g << 4) | g, (b << 4) | b))
            }
            6 => {
                let r = hex_byte(bytes, 0)?;
                let g = hex_byte(bytes, 2)?;
                let b = hex_byte(bytes, 4)?;
                Some(Self::Rgb(r, g, b))
            }
            _ => None,
        }
    }

    /// Parse any supported color format.
    ///
    /// Supports:
    /// - hex (`#RGB`, `#RRGGBB`)
    /// - named colors (`red`, `bright-blue`, `gray`)
    /// - palette indices (`196`)
    /// - `default` for the terminal default
    ///
    /// ```
    /// use spark_view::style::Color;
    ///
    /// assert_eq!(Color::parse("#ff0000").unwrap(), Color::Rgb(255, 0, 0));
    /// assert_eq!(Color::parse("bright-blue").unwrap(), Color::Named(12));
    /// assert_eq!(Color::parse("236").unwrap(), Color::Indexed(236));
    /// assert!(Color::parse("not-a-color").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, Error> {
        let trimmed = input.trim();
        let lower = trimmed.to_lowercase();

        match lower.as_str() {
            "" => return Err(Error::Color(input.to_string())),
            "default" | "inherit" | "none" => return Ok(Self::Default),
            "gray" | "grey" => return Ok(Self::GRAY),
            _ => {}
        }

        if let Some(index) = NAMES.iter().position(|name| *name == lower) {
            return Ok(Self::Named(index as u8));
        }

        if let Ok(index) = lower.parse::<u8>() {
            return Ok(Self::Indexed(index));
        }

        if trimmed.starts_with('#') {
            return Self::from_hex(trimmed).ok_or_else(|| Error::Color(input.to_string()));
        }

        Err(Error::Color(input.to_string()))
    }

    /// SGR parameters selecting this color as foreground.
    pub(crate) fn write_fg_params(&self, out: &mut String) {
        let _ = match *self {
            Self::Default => write!(out, "39"),
            Self::Named(i) if i < 8 => write!(out, "{}", 30 + i),
            Self::Named(i) => write!(out, "{}", 90 + (i.min(15) - 8)),
            Self::Indexed(i) => write!(out, "38;5;{}", i),
            Self::Rgb(r, g, b) => write!(out, "38;2;{};{};{}", r, g, b),
        };
    }

    /// SGR parameters selecting this color as background.
    pub(crate) fn write_bg_params(&self, out: &mut String) {
        let _ = match *self {
            Self::Default => write!(out, "49"),
            Self::Named(i) if i < 8 => write!(out, "{}", 40 + i),
            Self::Named(i) => write!(out, "{}", 100 + (i.min(15) - 8)),
            Self::Indexed(i) => write!(out, "48;5;{}", i),
            Self::Rgb(r, g, b) => write!(out, "48;2;{};{};{}", r, g, b),
        };
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::Rgb(r, g, b)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fg(color: Color) -> String {
        let mut s = String::new();
        color.write_fg_params(&mut s);
        s
    }

    fn bg(color: Color) -> String {
        let mut s = String::new();
        color.write_bg_params(&mut s);
        s
    }

    #[test]
    fn test_from_rgb_int() {
        assert_eq!(Color::from_rgb_int(0x282a36), Color::Rgb(40, 42, 54));
        assert_eq!(Color::from_rgb_int(0xffffff), Color::Rgb(255, 255, 255));
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("#ff0000"), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(Color::from_hex("#abc"), Some(Color::Rgb(0xaa, 0xbb, 0xcc)));
        assert_eq!(Color::from_hex("00ff00"), Some(Color::Rgb(0, 255, 0)));
        assert_eq!(Color::from_hex("#ff00"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_parse_names_and_keywords() {
        assert_eq!(Color::parse("red").unwrap(), Color::RED);
        assert_eq!(Color::parse("  Bright-White ").unwrap(), Color::Named(15));
        assert_eq!(Color::parse("grey").unwrap(), Color::GRAY);
        assert_eq!(Color::parse("default").unwrap(), Color::Default);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Color::parse("").is_err());
        assert!(Color::parse("rgb(1,2,3)").is_err());
        assert!(Color::parse("#12").is_err());
        assert!(Color::parse("300").is_err());
    }

    #[test]
    fn test_fg_params() {
        assert_eq!(fg(Color::Default), "39");
        assert_eq!(fg(Color::Named(1)), "31");
        assert_eq!(fg(Color::Named(7)), "37");
        assert_eq!(fg(Color::Named(8)), "90");
        assert_eq!(fg(Color::Named(15)), "97");
        assert_eq!(fg(Color::Indexed(196)), "38;5;196");
        assert_eq!(fg(Color::Rgb(255, 128, 64)), "38;2;255;128;64");
    }

    #[test]
    fn test_bg_params() {
        assert_eq!(bg(Color::Default), "49");
        assert_eq!(bg(Color::Named(1)), "41");
        assert_eq!(bg(Color::Named(9)), "101");
        assert_eq!(bg(Color::Indexed(236)), "48;5;236");
        assert_eq!(bg(Color::Rgb(0, 128, 255)), "48;2;0;128;255");
    }
}
