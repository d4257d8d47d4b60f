//! 显示用的字符与颜色
use serde::Deserialize;
use std::str::FromStr;
use strum_macros::EnumString;

/// Cell colours. Names parse case-insensitively ("yellow", "Brown"),
/// `rgb(r,g,b)` gives an exact colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Deserialize)]
#[strum(ascii_case_insensitive)]
#[serde(try_from = "String")]
pub enum Color {
    #[default]
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
    #[strum(serialize = "darkgray", serialize = "dark_gray")]
    DarkGray,
    White,
    Brown,
    #[strum(disabled)]
    Rgb(u8, u8, u8),
}

impl Color {
    /// Parse a colour name or `rgb(r,g,b)`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(body) = s.strip_prefix("rgb(").and_then(|rest| rest.strip_suffix(')')) {
            let parts: Vec<u8> = body
                .split(',')
                .filter_map(|p| p.trim().parse::<u8>().ok())
                .collect();
            return match parts.as_slice() {
                [r, g, b] => Some(Color::Rgb(*r, *g, *b)),
                _ => None,
            };
        }
        Color::from_str(s).ok()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value).ok_or_else(|| format!("unknown colour '{}'", value))
    }
}

/// A single drawable cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Glyph {
    pub const fn new(ch: char, fg: Color, bg: Color) -> Self {
        Self { ch, fg, bg }
    }
}
