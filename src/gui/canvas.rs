//! Page canvas
//!
//! Draws the laid-out page, card spotlights and the custom cursor, and turns
//! raw window events into [`Message`]s in page coordinates.

use iced::mouse;
use iced::widget::canvas::{self, Frame, Geometry, Path, Stroke, Text};
use iced::{keyboard, Color, Event, Pixels, Rectangle, Renderer, Size, Theme, Vector};

use crate::background::BackgroundFrame;
use crate::contact::{ContactForm, Field};
use crate::cursor::{CursorFrame, CursorVisualState};
use crate::geometry::{Point, Rect, Viewport};
use crate::layout::{Element, ElementKey};
use crate::page::{PageLayout, SKILL_BAR_HEIGHT, SKILL_BAR_MARGIN, THEME_TOGGLE_KEY};
use crate::scene::FrameSnapshot;
use crate::spotlight::RadialGradient;
use crate::theme::{Palette, ResolvedTheme, Rgb};

use super::app::field_for_key;
use super::message::{KeyInput, Message};
use super::theme::{color, color_alpha, colors};

/// Pixels per wheel line
const LINE_SCROLL: f32 = 48.0;
/// Circles used to approximate a radial gradient
const GRADIENT_RINGS: usize = 16;
const CARD_RADIUS: f32 = 12.0;
const TEXT_PADDING: f32 = 12.0;
/// Hero backdrop grid cell
const GRID_SPACING: f32 = 50.0;
/// Section the background sits behind
const HERO_KEY: &str = "hero";

/// Everything the canvas needs for one draw
pub struct PageCanvas<'a> {
    /// Current layout
    pub page: &'a PageLayout,
    /// Latest frame, if any
    pub snapshot: Option<&'a FrameSnapshot>,
    /// Colors
    pub palette: &'static Palette,
    /// Theme currently shown
    pub resolved: ResolvedTheme,
    /// Contact form contents
    pub form: &'a ContactForm,
    /// Field receiving keystrokes
    pub focused: Option<Field>,
}

/// Widget state kept by iced between events
#[derive(Debug, Default)]
pub struct CanvasState {
    size: Option<Size>,
    inside: bool,
}

impl canvas::Program<Message> for PageCanvas<'_> {
    type State = CanvasState;

    fn update(
        &self,
        state: &mut CanvasState,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        if state.size != Some(bounds.size()) {
            state.size = Some(bounds.size());
            return Some(canvas::Action::publish(Message::Resized(Viewport::new(
                bounds.width,
                bounds.height,
            ))));
        }

        match event {
            Event::Mouse(mouse::Event::CursorMoved { .. }) => match cursor.position_in(bounds) {
                Some(position) => {
                    state.inside = true;
                    Some(canvas::Action::publish(Message::PointerMoved(Point::new(
                        position.x, position.y,
                    ))))
                }
                None if state.inside => {
                    state.inside = false;
                    Some(canvas::Action::publish(Message::PointerLeft))
                }
                None => None,
            },
            Event::Mouse(mouse::Event::CursorLeft) => {
                state.inside = false;
                Some(canvas::Action::publish(Message::PointerLeft))
            }
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_in(bounds)?;
                Some(
                    canvas::Action::publish(Message::Pressed(Point::new(position.x, position.y)))
                        .and_capture(),
                )
            }
            Event::Mouse(mouse::Event::WheelScrolled { delta }) if cursor.is_over(bounds) => {
                let dy = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => -y * LINE_SCROLL,
                    mouse::ScrollDelta::Pixels { y, .. } => -y,
                };
                Some(canvas::Action::publish(Message::Scrolled(dy)).and_capture())
            }
            Event::Keyboard(keyboard::Event::KeyPressed { key, text, .. }) if self.focused.is_some() => {
                key_input(key, text.as_deref())
                    .map(|input| canvas::Action::publish(Message::Key(input)).and_capture())
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        _state: &CanvasState,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(iced::Point::ORIGIN, bounds.size(), color(self.palette.background));

        let tree = self.page.tree();
        let background = self.snapshot.and_then(|s| s.background.as_ref());
        if let (Some(background), Some(hero)) = (background, tree.element_box(&ElementKey::from(HERO_KEY))) {
            draw_background(&mut frame, hero, background, self.palette);
        }

        for id in tree.document_order() {
            if let Some(element) = tree.get(id) {
                self.draw_element(&mut frame, element);
            }
        }

        if let Some(snapshot) = self.snapshot {
            draw_cursor(&mut frame, &snapshot.cursor, self.palette.cursor());
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(&self, _state: &CanvasState, bounds: Rectangle, cursor: mouse::Cursor) -> mouse::Interaction {
        let hidden = self
            .snapshot
            .is_some_and(|s| s.cursor.native_cursor_hidden && s.cursor.visible);
        if hidden && cursor.is_over(bounds) {
            mouse::Interaction::Hidden
        } else {
            mouse::Interaction::default()
        }
    }
}

impl PageCanvas<'_> {
    fn draw_element(&self, frame: &mut Frame, element: &Element) {
        let palette = self.palette;
        let bounds = element.bounds();
        if bounds.is_degenerate() {
            return;
        }

        if element.has_class("header") {
            frame.fill_rectangle(top_left(bounds), size(bounds), color_alpha(palette.surface, 0.95));
            frame.stroke(
                &Path::line(
                    iced::Point::new(bounds.left, bounds.bottom()),
                    iced::Point::new(bounds.right(), bounds.bottom()),
                ),
                Stroke::default().with_color(color(palette.border)).with_width(1.0),
            );
        } else if element.has_class("card") {
            self.draw_card(frame, element);
        } else if element.has_class("badge") {
            let path = Path::rounded_rectangle(top_left(bounds), size(bounds), (bounds.height / 2.0).into());
            frame.fill(&path, color_alpha(palette.primary, 0.12));
            if let Some(label) = element.label() {
                clipped_text(frame, bounds, label, 12.0, color(palette.primary), Vector::new(10.0, 6.0));
            }
        } else if element.has_class("button") {
            if element.key().as_str() == THEME_TOGGLE_KEY {
                draw_theme_toggle(frame, bounds, self.resolved, palette);
            } else {
                let path = Path::rounded_rectangle(top_left(bounds), size(bounds), 6.0.into());
                frame.fill(&path, color(palette.primary));
                if let Some(label) = element.label() {
                    clipped_text(frame, bounds, label, 15.0, color(palette.primary_foreground), Vector::new(16.0, 12.0));
                }
            }
        } else if element.has_class("input") {
            self.draw_input(frame, element);
        } else if element.has_class("skill") {
            if let Some(label) = element.label() {
                clipped_text(frame, bounds, label, 14.0, color(palette.foreground), Vector::new(0.0, 0.0));
            }
            let track = Rect::new(
                bounds.left,
                bounds.bottom() - SKILL_BAR_HEIGHT - SKILL_BAR_MARGIN,
                bounds.width,
                SKILL_BAR_HEIGHT,
            );
            let path = Path::rounded_rectangle(top_left(track), size(track), (SKILL_BAR_HEIGHT / 2.0).into());
            frame.fill(&path, color_alpha(palette.primary, 0.15));
        } else if element.has_class("skill-level") {
            let path = Path::rounded_rectangle(top_left(bounds), size(bounds), (SKILL_BAR_HEIGHT / 2.0).into());
            frame.fill(&path, color(palette.primary));
            if let Some(label) = element.label() {
                frame.fill_text(Text {
                    content: label.to_string(),
                    position: iced::Point::new(bounds.right() - 32.0, bounds.top - 20.0),
                    color: color(palette.muted),
                    size: Pixels(12.0),
                    ..Text::default()
                });
            }
        } else if let Some(label) = element.label() {
            let (text_size, text_color) = if element.has_class("title") {
                (40.0, color(palette.primary))
            } else if element.has_class("heading") {
                (30.0, color(palette.foreground))
            } else if element.has_class("link") {
                (14.0, color(palette.secondary))
            } else if element.has_class("brand") {
                (22.0, color(palette.primary))
            } else if element.has_class("text") {
                (16.0, color(palette.muted))
            } else {
                (15.0, color(palette.foreground))
            };
            clipped_text(frame, bounds, label, text_size, text_color, Vector::new(0.0, 0.0));
        }
    }

    fn draw_card(&self, frame: &mut Frame, element: &Element) {
        let palette = self.palette;
        let bounds = element.bounds();
        let spotlight = self
            .snapshot
            .and_then(|s| s.spotlights.get(element.key()));

        // Tilt shows up as a shadow leaning away from the pointer
        let lean = spotlight.map_or(Vector::new(0.0, 4.0), |s| {
            Vector::new(-s.tilt_y_degrees * 0.8, 4.0 + s.tilt_x_degrees * 0.8)
        });
        let shadow = Path::rounded_rectangle(
            top_left(bounds) + lean,
            size(bounds),
            CARD_RADIUS.into(),
        );
        frame.fill(&shadow, colors::SHADOW);

        let path = Path::rounded_rectangle(top_left(bounds), size(bounds), CARD_RADIUS.into());
        frame.fill(&path, color(palette.surface));
        frame.stroke(&path, Stroke::default().with_color(color(palette.border)).with_width(1.0));

        if let Some(gradient) = spotlight.and_then(|s| s.gradient.as_ref()) {
            draw_spotlight(frame, bounds, gradient, palette.spotlight());
        }

        if let Some(label) = element.label() {
            clipped_text(
                frame,
                bounds,
                label,
                20.0,
                color(palette.foreground),
                Vector::new(24.0, 24.0),
            );
        }
    }

    fn draw_input(&self, frame: &mut Frame, element: &Element) {
        let palette = self.palette;
        let bounds = element.bounds();
        let field = field_for_key(element.key().as_str());
        let focused = field.is_some() && field == self.focused;

        if let Some(label) = element.label() {
            let label_at = Rect::new(bounds.left, bounds.top - 24.0, bounds.width, 24.0);
            clipped_text(frame, label_at, label, 14.0, color(palette.foreground), Vector::new(0.0, 2.0));
        }

        let path = Path::rounded_rectangle(top_left(bounds), size(bounds), 6.0.into());
        frame.fill(&path, color(palette.background));
        let outline = if focused { palette.primary } else { palette.border };
        frame.stroke(&path, Stroke::default().with_color(color(outline)).with_width(if focused { 2.0 } else { 1.0 }));

        let Some(field) = field else { return };
        let value = self.form.get(field);
        let shown = if focused { format!("{}|", value) } else { value.to_string() };
        clipped_text(frame, bounds, &shown, 15.0, color(palette.foreground), Vector::new(TEXT_PADDING, TEXT_PADDING));

        if let Some(error) = self.form.errors().get(field) {
            let below = Rect::new(bounds.left, bounds.bottom() + 2.0, bounds.width, 16.0);
            clipped_text(frame, below, &error.to_string(), 12.0, color(palette.error), Vector::new(0.0, 0.0));
        }
    }
}

fn top_left(rect: Rect) -> iced::Point {
    iced::Point::new(rect.left, rect.top)
}

fn size(rect: Rect) -> Size {
    Size::new(rect.width, rect.height)
}

fn rectangle(rect: Rect) -> Rectangle {
    Rectangle::new(top_left(rect), size(rect))
}

/// Text clipped to `bounds`, offset from its top-left corner
fn clipped_text(frame: &mut Frame, bounds: Rect, content: &str, text_size: f32, text_color: Color, offset: Vector) {
    frame.with_clip(rectangle(bounds), |f| {
        f.fill_text(Text {
            content: content.to_string(),
            position: iced::Point::new(offset.x, offset.y),
            color: text_color,
            size: Pixels(text_size),
            ..Text::default()
        });
    });
}

/// Concentric translucent circles clipped to `clip`; `center` is in page
/// coordinates
fn draw_radial(frame: &mut Frame, clip: Rect, center: Point, radius: f32, tint: Rgb, alpha: f32) {
    if radius <= 0.0 || clip.is_degenerate() {
        return;
    }
    let center = iced::Point::new(center.x - clip.left, center.y - clip.top);
    let alpha = alpha / GRADIENT_RINGS as f32;
    frame.with_clip(rectangle(clip), |f| {
        for ring in (1..=GRADIENT_RINGS).rev() {
            let r = radius * ring as f32 / GRADIENT_RINGS as f32;
            f.fill(&Path::circle(center, r), color_alpha(tint, alpha));
        }
    });
}

fn draw_spotlight(frame: &mut Frame, card: Rect, gradient: &RadialGradient, tint: Rgb) {
    draw_radial(frame, card, gradient.center, gradient.radius, tint, gradient.alpha);
}

/// Pointer-following glow, drifting orbs and a faint grid behind the hero
fn draw_background(frame: &mut Frame, hero: Rect, background: &BackgroundFrame, palette: &Palette) {
    if hero.is_degenerate() {
        return;
    }
    let glow_center = Point::new(
        hero.left + background.center.x * hero.width,
        hero.top + background.center.y * hero.height,
    );
    let glow_radius = 0.4 * hero.width.max(hero.height);
    draw_radial(frame, hero, glow_center, glow_radius, palette.primary, 0.06 * background.opacity);

    for orb in &background.orbs {
        let center = Point::new(
            hero.left + orb.anchor.x * hero.width + orb.offset.x,
            hero.top + orb.anchor.y * hero.height + orb.offset.y,
        );
        draw_radial(frame, hero, center, orb.radius * 0.7, palette.primary, 0.05);
    }

    let grid = Stroke::default()
        .with_color(color_alpha(palette.primary, 0.01))
        .with_width(1.0);
    frame.with_clip(rectangle(hero), |f| {
        let mut x = 0.0;
        while x < hero.width {
            f.stroke(&Path::line(iced::Point::new(x, 0.0), iced::Point::new(x, hero.height)), grid);
            x += GRID_SPACING;
        }
        let mut y = 0.0;
        while y < hero.height {
            f.stroke(&Path::line(iced::Point::new(0.0, y), iced::Point::new(hero.width, y)), grid);
            y += GRID_SPACING;
        }
    });
}

fn draw_theme_toggle(frame: &mut Frame, bounds: Rect, resolved: ResolvedTheme, palette: &Palette) {
    let center = bounds.center();
    let center = iced::Point::new(center.x, center.y);
    let ink = color(palette.foreground);
    match resolved {
        // Sun: switch to light
        ResolvedTheme::Dark => {
            frame.fill(&Path::circle(center, 6.0), ink);
            for i in 0..8 {
                let angle = i as f32 * std::f32::consts::FRAC_PI_4;
                let (sin, cos) = angle.sin_cos();
                frame.stroke(
                    &Path::line(
                        center + Vector::new(cos * 9.0, sin * 9.0),
                        center + Vector::new(cos * 12.0, sin * 12.0),
                    ),
                    Stroke::default().with_color(ink).with_width(2.0),
                );
            }
        }
        // Moon: switch to dark
        ResolvedTheme::Light => {
            frame.fill(&Path::circle(center, 9.0), ink);
            frame.fill(
                &Path::circle(center + Vector::new(4.0, -4.0), 8.0),
                color(palette.background),
            );
        }
    }
}

fn draw_cursor(frame: &mut Frame, cursor: &CursorFrame, tint: Rgb) {
    if !cursor.visible {
        return;
    }

    match &cursor.state {
        CursorVisualState::Idle { position } => {
            let center = cursor.rect.center();
            let ring = Path::rectangle(
                iced::Point::new(-cursor.rect.width / 2.0, -cursor.rect.height / 2.0),
                Size::new(cursor.rect.width, cursor.rect.height),
            );
            frame.with_save(|f| {
                f.translate(Vector::new(center.x, center.y));
                f.rotate(cursor.rotation_degrees.to_radians());
                f.stroke(&ring, Stroke::default().with_color(color(tint)).with_width(2.0));
            });
            frame.fill(
                &Path::circle(iced::Point::new(position.x, position.y), 2.5),
                color(tint),
            );
        }
        CursorVisualState::Framing { .. } => {
            for bracket in &cursor.corners {
                let stroke = Stroke::default()
                    .with_color(color_alpha(tint, bracket.opacity))
                    .with_width(3.0);
                let corner = iced::Point::new(bracket.corner.x, bracket.corner.y);
                frame.stroke(
                    &Path::line(
                        corner,
                        iced::Point::new(bracket.horizontal_end.x, bracket.horizontal_end.y),
                    ),
                    stroke,
                );
                frame.stroke(
                    &Path::line(
                        corner,
                        iced::Point::new(bracket.vertical_end.x, bracket.vertical_end.y),
                    ),
                    stroke,
                );
            }
        }
    }
}

/// Editing action for a key press while a field has focus
pub fn key_input(key: &keyboard::Key, text: Option<&str>) -> Option<KeyInput> {
    use keyboard::key::Named;

    match key {
        keyboard::Key::Named(Named::Backspace) => Some(KeyInput::Backspace),
        keyboard::Key::Named(Named::Tab) => Some(KeyInput::NextField),
        keyboard::Key::Named(Named::Enter) => Some(KeyInput::Enter),
        keyboard::Key::Named(Named::Escape) => Some(KeyInput::Escape),
        _ => text
            .filter(|t| !t.is_empty() && !t.chars().any(char::is_control))
            .map(|t| KeyInput::Text(t.to_string())),
    }
}
