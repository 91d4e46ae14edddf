//! Highlight colors per resolved theme

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ResolvedTheme;

/// 8-bit sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Rgb {
    /// Color from components
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to `[0, 1]`
    pub fn to_f32(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Colors used by the page and the pointer effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Page background
    pub background: Rgb,
    /// Card and header surfaces
    pub surface: Rgb,
    /// Card borders
    pub border: Rgb,
    /// Body text
    pub foreground: Rgb,
    /// Secondary text
    pub muted: Rgb,
    /// Brand color; cursor ring, brackets and spotlight tint
    pub primary: Rgb,
    /// Text drawn on top of `primary`
    pub primary_foreground: Rgb,
    /// Links to live demos
    pub secondary: Rgb,
    /// Validation messages
    pub error: Rgb,
}

/// Light palette
pub const LIGHT: Palette = Palette {
    background: Rgb::new(0xff, 0xff, 0xff),
    surface: Rgb::new(0xf8, 0xfa, 0xfc),
    border: Rgb::new(0xe2, 0xe8, 0xf0),
    foreground: Rgb::new(0x0f, 0x17, 0x2a),
    muted: Rgb::new(0x64, 0x74, 0x8b),
    primary: Rgb::new(0x25, 0x63, 0xeb),
    primary_foreground: Rgb::new(0xf8, 0xfa, 0xfc),
    secondary: Rgb::new(0x7c, 0x3a, 0xed),
    error: Rgb::new(0xdc, 0x26, 0x26),
};

/// Dark palette
pub const DARK: Palette = Palette {
    background: Rgb::new(0x02, 0x06, 0x17),
    surface: Rgb::new(0x0f, 0x17, 0x2a),
    border: Rgb::new(0x1e, 0x29, 0x3b),
    foreground: Rgb::new(0xf8, 0xfa, 0xfc),
    muted: Rgb::new(0x94, 0xa3, 0xb8),
    primary: Rgb::new(0x60, 0xa5, 0xfa),
    primary_foreground: Rgb::new(0x0f, 0x17, 0x2a),
    secondary: Rgb::new(0xa7, 0x8b, 0xfa),
    error: Rgb::new(0xf8, 0x71, 0x71),
};

impl Palette {
    /// Palette for a resolved theme
    pub fn for_theme(theme: ResolvedTheme) -> &'static Palette {
        match theme {
            ResolvedTheme::Light => &LIGHT,
            ResolvedTheme::Dark => &DARK,
        }
    }

    /// Cursor ring and bracket color
    pub fn cursor(&self) -> Rgb {
        self.primary
    }

    /// Spotlight gradient tint
    pub fn spotlight(&self) -> Rgb {
        self.primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_display() {
        assert_eq!(LIGHT.primary.to_string(), "#2563eb");
    }

    #[test]
    fn test_for_theme() {
        assert_eq!(Palette::for_theme(ResolvedTheme::Dark), &DARK);
        assert_ne!(LIGHT.cursor(), DARK.cursor());
    }
}
