//! Styled text fragments
//!
//! A [`Snippet`] carries text plus optional per-axis style overrides. An unset
//! override means "inherit the ambient style"; `Some(false)` explicitly turns
//! the axis off. Resolution against an ambient [`Style`] happens in
//! [`Snippet::resolve`], rendering is left to whoever displays the text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::application::errors::ConsoleError;

/// RGBA color value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const GRAY: Color = Color::rgb(0x80, 0x80, 0x80);
    pub const RED: Color = Color::rgb(0xff, 0x00, 0x00);
    pub const GREEN: Color = Color::rgb(0x00, 0x80, 0x00);
    pub const BLUE: Color = Color::rgb(0x00, 0x00, 0xff);
    pub const YELLOW: Color = Color::rgb(0xff, 0xff, 0x00);
    pub const CYAN: Color = Color::rgb(0x00, 0xff, 0xff);
    pub const MAGENTA: Color = Color::rgb(0xff, 0x00, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 0xff
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();

        match digits.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque
    pub fn to_hex(&self) -> String {
        if self.is_opaque() {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s).ok_or_else(|| ConsoleError::InvalidArgument(format!("not a hex color: {}", s)))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl TryFrom<String> for Color {
    type Error = ConsoleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Fully resolved style, as a renderer applies it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Style {
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
    pub underlined: bool,
    pub strikethrough: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            bold: false,
            italic: false,
            underlined: false,
            strikethrough: false,
        }
    }
}

/// Uniformly styled portion of a message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snippet {
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    underlined: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    strikethrough: Option<bool>,
}

impl Snippet {
    /// Snippet with no style overrides
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            bold: None,
            italic: None,
            underlined: None,
            strikethrough: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    pub fn with_underlined(mut self, underlined: bool) -> Self {
        self.underlined = Some(underlined);
        self
    }

    pub fn with_strikethrough(mut self, strikethrough: bool) -> Self {
        self.strikethrough = Some(strikethrough);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn color_override(&self) -> Option<Color> {
        self.color
    }

    pub fn bold_override(&self) -> Option<bool> {
        self.bold
    }

    pub fn italic_override(&self) -> Option<bool> {
        self.italic
    }

    pub fn underlined_override(&self) -> Option<bool> {
        self.underlined
    }

    pub fn strikethrough_override(&self) -> Option<bool> {
        self.strikethrough
    }

    /// True when no axis is overridden
    pub fn is_plain(&self) -> bool {
        self.color.is_none()
            && self.bold.is_none()
            && self.italic.is_none()
            && self.underlined.is_none()
            && self.strikethrough.is_none()
    }

    /// Apply the overrides on top of an ambient style
    pub fn resolve(&self, ambient: &Style) -> Style {
        Style {
            color: self.color.unwrap_or(ambient.color),
            bold: self.bold.unwrap_or(ambient.bold),
            italic: self.italic.unwrap_or(ambient.italic),
            underlined: self.underlined.unwrap_or(ambient.underlined),
            strikethrough: self.strikethrough.unwrap_or(ambient.strikethrough),
        }
    }
}

impl From<&str> for Snippet {
    fn from(text: &str) -> Self {
        Snippet::new(text)
    }
}

impl From<String> for Snippet {
    fn from(text: String) -> Self {
        Snippet::new(text)
    }
}
