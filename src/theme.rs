//! Theme colors: a background and a foreground used at varying alpha.

use crate::error::EngineError;
use log::warn;
use std::cell::Cell;
use std::rc::Rc;
use std::str::FromStr;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Color {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

impl Color {
  pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
    Self { r, g, b }
  }

  /// Parses `#rrggbb` or `#rgb`.
  pub fn from_hex(value: &str) -> Result<Self, EngineError> {
    let invalid = || EngineError::InvalidColor(value.to_string());
    let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !hex.is_ascii() {
      return Err(invalid());
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match hex.len() {
      6 => Ok(Self::rgb(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
      3 => {
        let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
        Ok(Self::rgb(short(0)?, short(1)?, short(2)?))
      }
      _ => Err(invalid()),
    }
  }

  pub fn to_hex(self) -> String {
    format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
  }
}

impl FromStr for Color {
  type Err = EngineError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::from_hex(s)
  }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Theme {
  pub background: Color,
  pub foreground: Color,
}

impl Default for Theme {
  fn default() -> Self {
    Self::DARK
  }
}

impl Theme {
  pub const DARK: Theme = Theme {
    background: Color::rgb(0x0a, 0x0a, 0x0a),
    foreground: Color::rgb(0xfa, 0xfa, 0xfa),
  };

  pub const LIGHT: Theme = Theme {
    background: Color::rgb(0xfa, 0xfa, 0xfa),
    foreground: Color::rgb(0x0a, 0x0a, 0x0a),
  };

  /// Builds a theme from raw style values, falling back to the dark defaults
  /// for anything empty or unparsable.
  pub fn from_css_values(background: &str, foreground: &str) -> Self {
    Self {
      background: parse_or(background, Self::DARK.background),
      foreground: parse_or(foreground, Self::DARK.foreground),
    }
  }
}

fn parse_or(value: &str, fallback: Color) -> Color {
  if value.trim().is_empty() {
    return fallback;
  }
  match Color::from_hex(value) {
    Ok(color) => color,
    Err(err) => {
      warn!("{err}, using {}", fallback.to_hex());
      fallback
    }
  }
}

/// Shared theme slot. Clones observe the same value; writers never touch the
/// timeline, readers pick up changes on the next frame.
#[derive(Clone, Debug, Default)]
pub struct ThemeHandle(Rc<Cell<Theme>>);

impl ThemeHandle {
  pub fn new(theme: Theme) -> Self {
    Self(Rc::new(Cell::new(theme)))
  }

  pub fn get(&self) -> Theme {
    self.0.get()
  }

  pub fn set(&self, theme: Theme) {
    self.0.set(theme);
  }
}
