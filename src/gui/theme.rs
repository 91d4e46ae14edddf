//! Visual theme built from the page palette.
//!
//! Both palettes come from [`crate::theme::palette`]; this module only turns
//! them into iced colors and widget styles.

use iced::widget::{button, container};
use iced::{Background, Border, Color, Shadow, Theme};

use crate::theme::{Palette, ResolvedTheme, Rgb};

/// Fixed colors that do not follow the palette
pub mod colors {
    use iced::Color;

    pub const SHADOW: Color = Color::from_rgba(0.0, 0.0, 0.0, 0.08);
}

/// Palette color as an iced color
pub fn color(rgb: Rgb) -> Color {
    let [r, g, b] = rgb.to_f32();
    Color::from_rgb(r, g, b)
}

/// Palette color with alpha
pub fn color_alpha(rgb: Rgb, alpha: f32) -> Color {
    Color {
        a: alpha.clamp(0.0, 1.0),
        ..color(rgb)
    }
}

/// Built-in iced theme for widgets drawn outside the canvas
pub fn iced_theme(resolved: ResolvedTheme) -> Theme {
    match resolved {
        ResolvedTheme::Light => Theme::Light,
        ResolvedTheme::Dark => Theme::Dark,
    }
}

/// Filled button in the brand color
pub fn primary_button_style(palette: &'static Palette) -> impl Fn(&Theme, button::Status) -> button::Style {
    move |_theme: &Theme, status: button::Status| {
        let base = button::Style {
            background: Some(Background::Color(color(palette.primary))),
            text_color: color(palette.primary_foreground),
            border: Border {
                color: color(palette.primary),
                width: 1.0,
                radius: 6.0.into(),
            },
            shadow: Shadow::default(),
            snap: false,
        };

        match status {
            button::Status::Active => base,
            button::Status::Hovered => button::Style {
                background: Some(Background::Color(color_alpha(palette.primary, 0.9))),
                ..base
            },
            button::Status::Pressed => button::Style {
                background: Some(Background::Color(color_alpha(palette.primary, 0.8))),
                ..base
            },
            button::Status::Disabled => button::Style {
                background: Some(Background::Color(color(palette.border))),
                text_color: color(palette.muted),
                ..base
            },
        }
    }
}

/// Status bar along the bottom of the window
pub fn status_bar_style(palette: &'static Palette) -> impl Fn(&Theme) -> container::Style {
    move |_theme: &Theme| container::Style {
        background: Some(Background::Color(color(palette.surface))),
        border: Border {
            color: color(palette.border),
            width: 1.0,
            radius: 0.0.into(),
        },
        text_color: Some(color(palette.muted)),
        shadow: Shadow::default(),
        snap: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{DARK, LIGHT};

    #[test]
    fn test_color_conversion() {
        let c = color(LIGHT.primary);
        assert!((c.r - 0x25 as f32 / 255.0).abs() < 1e-6);
        assert!((c.b - 0xeb as f32 / 255.0).abs() < 1e-6);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn test_alpha_clamped() {
        assert_eq!(color_alpha(DARK.primary, 2.0).a, 1.0);
        assert_eq!(color_alpha(DARK.primary, -1.0).a, 0.0);
    }
}
