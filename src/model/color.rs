use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Vector3;

/// RGBA color with 8-bit channels, as a light block stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Recognized color names, matched case-insensitively.
const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::BLACK),
    ("white", Color::WHITE),
    ("red", Color::rgb(255, 0, 0)),
    ("green", Color::rgb(0, 128, 0)),
    ("lime", Color::rgb(0, 255, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
    ("orange", Color::rgb(255, 165, 0)),
    ("purple", Color::rgb(128, 0, 128)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("pink", Color::rgb(255, 192, 203)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("teal", Color::rgb(0, 128, 128)),
    ("brown", Color::rgb(165, 42, 42)),
    ("gray", Color::rgb(128, 128, 128)),
    ("grey", Color::rgb(128, 128, 128)),
    ("silver", Color::rgb(192, 192, 192)),
    ("gold", Color::rgb(255, 215, 0)),
    ("navy", Color::rgb(0, 0, 128)),
];

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Look up a named color.
    pub fn named(name: &str) -> Option<Self> {
        let name = name.trim();
        NAMED_COLORS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, c)| *c)
    }

    /// Parse `"<r>:<g>:<b>"` (integers 0-255) or a color name.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(color) = Self::named(s) {
            return Some(color);
        }
        let mut parts = s.split(':').map(|p| p.trim().parse::<u8>());
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) => Some(Self::rgb(r, g, b)),
            _ => None,
        }
    }

    /// Channels map 1:1 onto vector components.
    pub fn to_vector(self) -> Vector3 {
        Vector3::new(f64::from(self.r), f64::from(self.g), f64::from(self.b))
    }

    /// Round each component to a channel. `None` when any lies outside 0-255.
    pub fn from_vector(v: Vector3) -> Option<Self> {
        let channel = |c: f64| (0.0..=255.0).contains(&c).then(|| c.round() as u8);
        Some(Self::rgb(channel(v.x)?, channel(v.y)?, channel(v.z)?))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        Self::parse(s).ok_or_else(|| format!("Not a color: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_triplet() {
        assert_eq!(Color::parse("255:128:0"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(Color::parse("0:0:0"), Some(Color::BLACK));
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(Color::parse("blue"), Some(Color::rgb(0, 0, 255)));
        assert_eq!(Color::parse("BLUE"), Some(Color::rgb(0, 0, 255)));
        assert_eq!("Red".parse::<Color>().unwrap(), Color::rgb(255, 0, 0));
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(Color::parse("banana"), None);
        assert_eq!(Color::parse("256:0:0"), None);
        assert_eq!(Color::parse("1:2"), None);
        assert_eq!(Color::parse("1:2:3:4"), None);
        assert_eq!(Color::parse("-1:2:3"), None);
    }

    #[test]
    fn vector_conversion_rounds_and_rejects_out_of_range() {
        let c = Color::from_vector(Vector3::new(0.0, 127.6, 255.0));
        assert_eq!(c, Some(Color::rgb(0, 128, 255)));
        assert_eq!(Color::from_vector(Vector3::new(300.0, 0.0, 0.0)), None);
        assert_eq!(Color::from_vector(Vector3::new(0.0, -5.0, 0.0)), None);
        assert_eq!(Color::from_vector(Vector3::new(0.0, 0.0, f64::NAN)), None);
        let v = Color::rgb(255, 128, 0).to_vector();
        assert_eq!(v, Vector3::new(255.0, 128.0, 0.0));
    }

    #[test]
    fn display_is_triplet() {
        assert_eq!(Color::rgb(1, 2, 3).to_string(), "1:2:3");
    }
}
