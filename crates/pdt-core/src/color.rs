//! Colors and paints carried by scene items.
//!
//! The inspector only ever shows colors as CSS strings, so this module owns
//! both directions of that boundary: [`Color::to_css`] for serialization and
//! [`Paint::from_value`] for edits coming back from the panel. Gradients do
//! not survive the trip out; they are dropped from serialized properties.

use crate::error::WriteError;
use serde_json::Value;
use winnow::combinator::alt;
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::take_while;

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("orange", [255, 165, 0]),
    ("purple", [128, 0, 128]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
];

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let nibbles: Vec<u8> = bytes.iter().map(|&c| hex_val(c)).collect::<Option<_>>()?;
        let channels: Vec<u8> = match nibbles.len() {
            3 | 4 => nibbles.iter().map(|n| n * 17).collect(),
            6 | 8 => nibbles.chunks(2).map(|p| p[0] << 4 | p[1]).collect(),
            _ => return None,
        };
        let alpha = channels.get(3).copied().unwrap_or(255);
        Some(Self::rgba(
            channels[0] as f32 / 255.0,
            channels[1] as f32 / 255.0,
            channels[2] as f32 / 255.0,
            alpha as f32 / 255.0,
        ))
    }

    /// Parse a CSS color: hex, `rgb(r, g, b)`, `rgba(r, g, b, a)`, or one of
    /// a handful of named colors. Case and surrounding whitespace are ignored.
    pub fn parse_css(text: &str) -> Option<Self> {
        let lowered = text.trim().to_ascii_lowercase();
        let mut input = lowered.as_str();
        let color = alt((parse_hex_color, parse_rgb_function, parse_named_color))
            .parse_next(&mut input)
            .ok()?;
        input.trim().is_empty().then_some(color)
    }

    fn channels8(&self) -> (u8, u8, u8) {
        let to8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (to8(self.r), to8(self.g), to8(self.b))
    }

    /// CSS form used on the wire: `#rrggbb` when opaque, `rgba(...)` otherwise.
    pub fn to_css(&self) -> String {
        let (r, g, b) = self.channels8();
        if self.a >= 1.0 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            let alpha = (self.a.clamp(0.0, 1.0) * 1000.0).round() / 1000.0;
            format!("rgba({r},{g},{b},{alpha})")
        }
    }
}

/// A gradient stop.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    pub offset: f32, // 0.0 .. 1.0
    pub color: Color,
}

/// Fill or stroke paint.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Gradient { radial: bool, stops: Vec<GradientStop> },
}

impl Paint {
    /// The CSS string shown in the inspector, if this paint has one.
    pub fn to_css(&self) -> Option<String> {
        match self {
            Paint::Solid(color) => Some(color.to_css()),
            Paint::Gradient { .. } => None,
        }
    }

    /// Parse a paint from a panel-supplied value.
    ///
    /// `null` clears the paint (`Ok(None)`). Strings go through
    /// [`Color::parse_css`]; objects may be `{red, green, blue, alpha?}` or
    /// `{gray, alpha?}` with channels in `[0, 1]`; arrays are `[r, g, b, a?]`
    /// in the same range.
    pub fn from_value(value: &Value) -> Result<Option<Self>, WriteError> {
        let invalid = || WriteError::InvalidColor(value.to_string());
        let color = match value {
            Value::Null => return Ok(None),
            Value::String(s) => Color::parse_css(s).ok_or_else(invalid)?,
            Value::Object(map) => {
                let channel = |key: &str, default: Option<f32>| -> Result<f32, WriteError> {
                    match map.get(key) {
                        Some(v) => unit_channel(v).ok_or_else(invalid),
                        None => default.ok_or_else(invalid),
                    }
                };
                let alpha = channel("alpha", Some(1.0))?;
                if map.contains_key("gray") {
                    let gray = channel("gray", None)?;
                    Color::rgba(gray, gray, gray, alpha)
                } else {
                    Color::rgba(
                        channel("red", None)?,
                        channel("green", None)?,
                        channel("blue", None)?,
                        alpha,
                    )
                }
            }
            Value::Array(items) if items.len() == 3 || items.len() == 4 => {
                let channels: Vec<f32> = items
                    .iter()
                    .map(unit_channel)
                    .collect::<Option<_>>()
                    .ok_or_else(invalid)?;
                Color::rgba(
                    channels[0],
                    channels[1],
                    channels[2],
                    channels.get(3).copied().unwrap_or(1.0),
                )
            }
            _ => return Err(invalid()),
        };
        Ok(Some(Paint::Solid(color)))
    }
}

fn unit_channel(value: &Value) -> Option<f32> {
    let v = value.as_f64()?;
    (0.0..=1.0).contains(&v).then_some(v as f32)
}

// ─── CSS color parsers ──────────────────────────────────────────────────

/// Consume optional whitespace (concrete error type avoids inference issues).
fn skip_space(input: &mut &str) {
    use winnow::ascii::space0;
    let _: Result<&str, winnow::error::ErrMode<ContextError>> = space0.parse_next(input);
}

fn backtrack<T>() -> ModalResult<T> {
    Err(winnow::error::ErrMode::Backtrack(ContextError::new()))
}

fn parse_hex_color(input: &mut &str) -> ModalResult<Color> {
    let _ = '#'.parse_next(input)?;
    let digits: &str = take_while(1..=8, |c: char| c.is_ascii_hexdigit()).parse_next(input)?;
    Color::from_hex(digits).map_or_else(backtrack, Ok)
}

/// Unsigned decimal: `255`, `0.5`, `.5`.
fn parse_channel(input: &mut &str) -> ModalResult<f32> {
    let text: &str = take_while(1.., |c: char| c.is_ascii_digit() || c == '.').parse_next(input)?;
    text.parse::<f32>().or_else(|_| backtrack())
}

/// `rgb(255, 0, 0)` or `rgba(255, 0, 0, 0.5)`.
fn parse_rgb_function(input: &mut &str) -> ModalResult<Color> {
    let has_alpha = alt(("rgba(".value(true), "rgb(".value(false))).parse_next(input)?;
    let count = if has_alpha { 4 } else { 3 };

    let mut channels = [0.0f32, 0.0, 0.0, 1.0];
    for (i, slot) in channels.iter_mut().take(count).enumerate() {
        skip_space(input);
        if i > 0 {
            let _ = ','.parse_next(input)?;
            skip_space(input);
        }
        *slot = parse_channel.parse_next(input)?;
    }
    skip_space(input);
    let _ = ')'.parse_next(input)?;

    let [r, g, b, a] = channels;
    let in_byte = |c: f32| (0.0..=255.0).contains(&c);
    if !(in_byte(r) && in_byte(g) && in_byte(b) && (0.0..=1.0).contains(&a)) {
        return backtrack();
    }
    Ok(Color::rgba(r / 255.0, g / 255.0, b / 255.0, a))
}

fn parse_named_color(input: &mut &str) -> ModalResult<Color> {
    let name: &str = take_while(1.., |c: char| c.is_ascii_alphabetic()).parse_next(input)?;
    match NAMED_COLORS.iter().find(|(n, _)| *n == name) {
        Some((_, [r, g, b])) => Ok(Color::from_rgb8(*r, *g, *b)),
        None => backtrack(),
    }
}
