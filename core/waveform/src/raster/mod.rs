use std::{fmt, str::FromStr};

pub mod canvas;
#[cfg(test)]
pub mod recording;

/// A surface the waveform can be painted on, addressed in pixels with the
/// origin in the top-left corner.
pub trait RenderTarget {
    /// `(width, height)` in pixels.
    fn size(&self) -> (u32, u32);

    fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba);

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color '{0}', expected #rrggbb or #rrggbbaa")]
pub struct ColorParseError(String);

impl FromStr for Rgba {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_owned());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());

        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if hex.len() == 8 { channel(6)? } else { 255 },
        })
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

/// Colors used for one waveform drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bars: Rgba,
    pub start_marker: Rgba,
    pub end_marker: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            bars: Rgba::rgb(0x1c, 0x7e, 0xd6),
            start_marker: Rgba::rgb(0xff, 0x00, 0x00),
            end_marker: Rgba::rgb(0x00, 0x80, 0x00),
        }
    }
}

#[cfg(test)]
mod rgba_tests {
    use super::*;

    #[test]
    fn parses_six_digit_hex() {
        let color: Rgba = "#1c7ed6".parse().unwrap();
        assert_eq!(color, Rgba::rgb(0x1c, 0x7e, 0xd6));
    }

    #[test]
    fn parses_alpha_channel() {
        let color: Rgba = "#00ff0080".parse().unwrap();
        assert_eq!(color.a, 0x80);
        assert_eq!(color.to_string(), "#00ff0080");
    }

    #[test]
    fn rejects_missing_hash_and_bad_digits() {
        assert!("1c7ed6".parse::<Rgba>().is_err());
        assert!("#1c7ez6".parse::<Rgba>().is_err());
        assert!("#fff".parse::<Rgba>().is_err());
    }
}
