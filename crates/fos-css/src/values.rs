//! Property Value Decoders
//!
//! Typed readings of the string values held in a computed property set.
//! Only lengths and colors are decoded here; layout-specific properties are
//! interpreted by their consumers.

use crate::dict::Dictionary;

/// CSS length value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f32,
    pub unit: LengthUnit,
}

/// Length units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Px,
    Pt,
    Pc,
    In,
    Cm,
    Mm,
    Em,
    Ex,
    Ch,
    Rem,
    Percent,
    Vw,
    Vh,
}

impl LengthUnit {
    fn from_suffix(s: &str) -> Option<Self> {
        Some(match s.to_ascii_lowercase().as_str() {
            "px" => Self::Px,
            "pt" => Self::Pt,
            "pc" => Self::Pc,
            "in" => Self::In,
            "cm" => Self::Cm,
            "mm" => Self::Mm,
            "em" => Self::Em,
            "ex" => Self::Ex,
            "ch" => Self::Ch,
            "rem" => Self::Rem,
            "%" => Self::Percent,
            "vw" => Self::Vw,
            "vh" => Self::Vh,
            _ => return None,
        })
    }

    /// Pixels per unit for absolute units (96 px per inch)
    pub fn px_per_unit(self) -> Option<f32> {
        match self {
            Self::Px => Some(1.0),
            Self::Pt => Some(96.0 / 72.0),
            Self::Pc => Some(16.0),
            Self::In => Some(96.0),
            Self::Cm => Some(96.0 / 2.54),
            Self::Mm => Some(96.0 / 25.4),
            _ => None,
        }
    }
}

impl Length {
    pub fn px(value: f32) -> Self {
        Self { value, unit: LengthUnit::Px }
    }

    pub fn percent(value: f32) -> Self {
        Self { value, unit: LengthUnit::Percent }
    }

    pub fn zero() -> Self {
        Self::px(0.0)
    }

    /// Parse `12px`, `1.5em`, `50%`, `0`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
            .unwrap_or(s.len());
        let (num, unit) = s.split_at(split);
        let value: f32 = num.parse().ok()?;
        if unit.is_empty() {
            return (value == 0.0).then(Self::zero);
        }
        Some(Self {
            value,
            unit: LengthUnit::from_suffix(unit)?,
        })
    }

    /// Size in pixels for absolute units
    pub fn absolute_px(&self) -> Option<f32> {
        self.unit.px_per_unit().map(|k| self.value * k)
    }
}

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse any supported color notation
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::from_hex(hex);
        }
        let lower = s.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
        {
            return Self::from_rgb_args(args.strip_suffix(')')?);
        }
        Self::from_name(&lower)
    }

    /// Parse hex digits (`RGB`, `RGBA`, `RRGGBB`, `RRGGBBAA`)
    pub fn from_hex(hex: &str) -> Option<Self> {
        if !hex.is_ascii() {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => Some(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            4 => Some(Self::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    fn from_rgb_args(args: &str) -> Option<Self> {
        let parts: Vec<&str> = args
            .split([',', ' ', '/'])
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }
        let channel = |p: &str| -> Option<u8> {
            let v = match p.strip_suffix('%') {
                Some(pct) => pct.parse::<f32>().ok()? * 2.55,
                None => p.parse::<f32>().ok()?,
            };
            Some(v.round().clamp(0.0, 255.0) as u8)
        };
        let alpha = match parts.get(3) {
            None => 255,
            Some(p) => {
                let v = match p.strip_suffix('%') {
                    Some(pct) => pct.parse::<f32>().ok()? / 100.0,
                    None => p.parse::<f32>().ok()?,
                };
                (v.clamp(0.0, 1.0) * 255.0).round() as u8
            }
        };
        Some(Self::rgba(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, alpha))
    }

    /// Parse a named color
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "transparent" => Self::TRANSPARENT,
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "cyan" | "aqua" => Self::rgb(0, 255, 255),
            "magenta" | "fuchsia" => Self::rgb(255, 0, 255),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "silver" => Self::rgb(192, 192, 192),
            "maroon" => Self::rgb(128, 0, 0),
            "olive" => Self::rgb(128, 128, 0),
            "lime" => Self::rgb(0, 255, 0),
            "navy" => Self::rgb(0, 0, 128),
            "purple" => Self::rgb(128, 0, 128),
            "teal" => Self::rgb(0, 128, 128),
            "orange" => Self::rgb(255, 165, 0),
            "pink" => Self::rgb(255, 192, 203),
            "brown" => Self::rgb(165, 42, 42),
            "gold" => Self::rgb(255, 215, 0),
            "indigo" => Self::rgb(75, 0, 130),
            "violet" => Self::rgb(238, 130, 238),
            "beige" => Self::rgb(245, 245, 220),
            "ivory" => Self::rgb(255, 255, 240),
            "khaki" => Self::rgb(240, 230, 140),
            "coral" => Self::rgb(255, 127, 80),
            "salmon" => Self::rgb(250, 128, 114),
            "tomato" => Self::rgb(255, 99, 71),
            "crimson" => Self::rgb(220, 20, 60),
            "lightgray" | "lightgrey" => Self::rgb(211, 211, 211),
            "darkgray" | "darkgrey" => Self::rgb(169, 169, 169),
            "whitesmoke" => Self::rgb(245, 245, 245),
            "gainsboro" => Self::rgb(220, 220, 220),
            "lightblue" => Self::rgb(173, 216, 230),
            "skyblue" => Self::rgb(135, 206, 235),
            "steelblue" => Self::rgb(70, 130, 180),
            "royalblue" => Self::rgb(65, 105, 225),
            "darkblue" => Self::rgb(0, 0, 139),
            "lightgreen" => Self::rgb(144, 238, 144),
            "darkgreen" => Self::rgb(0, 100, 0),
            "darkred" => Self::rgb(139, 0, 0),
            _ => return None,
        })
    }
}

impl Dictionary {
    /// Value of `key` decoded as a length
    pub fn length(&self, key: &str) -> Option<Length> {
        self.get_str(key).and_then(Length::parse)
    }

    /// Value of `key` decoded as a color
    pub fn color(&self, key: &str) -> Option<Color> {
        self.get_str(key).and_then(Color::parse)
    }
}
