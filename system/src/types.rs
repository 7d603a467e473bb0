use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub type ConnectionId = u16;
/// Milliseconds on the caller's clock. Only differences between two values matter.
pub type Timestamp = u64;
pub type Point = euclid::default::Point2D<f32>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color {
        r: 0xff,
        g: 0xff,
        b: 0xff,
    };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl std::default::Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid color {0:?}, expected #rgb or #rrggbb")]
pub struct ColorParseError(pub String);

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ColorParseError(s.to_owned());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16);
        match hex.len() {
            3 => {
                // #abc == #aabbcc
                let short = |i: usize| channel(i..i + 1).map(|v| v * 0x11);
                Ok(Color::new(
                    short(0).map_err(|_| invalid())?,
                    short(1).map_err(|_| invalid())?,
                    short(2).map_err(|_| invalid())?,
                ))
            }
            6 => Ok(Color::new(
                channel(0..2).map_err(|_| invalid())?,
                channel(2..4).map_err(|_| invalid())?,
                channel(4..6).map_err(|_| invalid())?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineStyle {
    #[serde(alias = "normal")]
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    /// Dash pattern as passed to a 2d context's `setLineDash`.
    pub fn dash_pattern(&self) -> &'static [f32] {
        match self {
            LineStyle::Solid => &[],
            LineStyle::Dashed => &[5.0, 5.0],
            LineStyle::Dotted => &[2.0, 2.0],
        }
    }
}

impl std::default::Default for LineStyle {
    fn default() -> Self {
        LineStyle::Solid
    }
}

impl FromStr for LineStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" | "normal" => Ok(LineStyle::Solid),
            "dashed" => Ok(LineStyle::Dashed),
            "dotted" => Ok(LineStyle::Dotted),
            other => Err(format!("unknown line style: {}", other)),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Line,
}

impl FromStr for ShapeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rectangle" => Ok(ShapeKind::Rectangle),
            "circle" => Ok(ShapeKind::Circle),
            "line" => Ok(ShapeKind::Line),
            other => Err(format!("unknown shape: {}", other)),
        }
    }
}
