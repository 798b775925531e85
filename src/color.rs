//! RGBA color used by material profiles and the renderer

use serde::{Deserialize, Serialize};

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const SKY: Color = Color::rgb(0xdd, 0xe8, 0xf0);
    pub const EARTH: Color = Color::rgb(0x6b, 0x4f, 0x2f);
    pub const GRASS: Color = Color::rgb(0x55, 0x7a, 0x3a);
    pub const YELLOW: Color = Color::rgb(0xf5, 0xc5, 0x18);
    pub const ORANGE: Color = Color::rgb(0xf0, 0x7f, 0x13);
    pub const RED: Color = Color::rgb(0xd3, 0x2f, 0x2f);
    pub const DUST: Color = Color::rgba(0x9a, 0x8c, 0x7a, 140);
    pub const PANEL: Color = Color::rgba(0x10, 0x18, 0x20, 190);
    pub const WAVE: Color = Color::rgb(0x1e, 0x88, 0xe5);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Darken by a factor in [0, 1] (0 = unchanged, 1 = black)
    pub fn darken(self, amount: f64) -> Self {
        let k = (1.0 - amount.clamp(0.0, 1.0)) as f32;
        Self {
            r: (self.r as f32 * k) as u8,
            g: (self.g as f32 * k) as u8,
            b: (self.b as f32 * k) as u8,
            a: self.a,
        }
    }

    /// CSS color string, e.g. `rgba(158,158,158,1.000)`
    pub fn to_css(self) -> String {
        format!(
            "rgba({},{},{},{:.3})",
            self.r,
            self.g,
            self.b,
            self.a as f64 / 255.0
        )
    }

    /// Hex string without alpha, e.g. `#9e9e9e`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
