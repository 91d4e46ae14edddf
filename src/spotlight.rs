//! Spotlight Presenter
//!
//! Hover highlight for cards: a radial gradient centered under the pointer,
//! transparent at a fixed radius, that fades in on enter and fades out on
//! leave. Cards may also tilt toward the pointer.
//!
//! Every card owns its own presenter and springs; nothing is shared.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geometry::{Point, Rect};
use crate::spring::{Spring, SpringConfig};

/// Class marking elements that get a spotlight
pub const SPOTLIGHT_CLASS: &str = "spotlight-card";

/// Configuration shared by every spotlight card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotlightConfig {
    /// Gradient radius; fully transparent beyond it (pixels)
    #[serde(default = "default_radius")]
    pub radius: f32,

    /// Seconds to fade fully in or out
    #[serde(default = "default_fade_duration")]
    pub fade_duration_secs: f32,

    /// Peak gradient alpha at the center
    #[serde(default = "default_intensity")]
    pub intensity: f32,

    /// Tilt the card toward the pointer
    #[serde(default = "default_true")]
    pub tilt_enabled: bool,

    /// Largest tilt on either axis (degrees)
    #[serde(default = "default_max_tilt")]
    pub max_tilt_degrees: f32,

    /// Pointer offset that produces the largest tilt (pixels)
    #[serde(default = "default_tilt_range")]
    pub tilt_range: f32,
}

fn default_radius() -> f32 {
    300.0
}
fn default_fade_duration() -> f32 {
    0.3
}
fn default_intensity() -> f32 {
    0.125
}
fn default_true() -> bool {
    true
}
fn default_max_tilt() -> f32 {
    10.0
}
fn default_tilt_range() -> f32 {
    300.0
}

impl Default for SpotlightConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            fade_duration_secs: default_fade_duration(),
            intensity: default_intensity(),
            tilt_enabled: default_true(),
            max_tilt_degrees: default_max_tilt(),
            tilt_range: default_tilt_range(),
        }
    }
}

/// Pointer offset from the card center
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpotlightState {
    /// Horizontal offset from the card center
    pub offset_x: f32,
    /// Vertical offset from the card center
    pub offset_y: f32,
    /// Pointer currently inside the card
    pub active: bool,
}

/// Gradient to paint over the card
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialGradient {
    /// Gradient center in viewport pixels
    pub center: Point,
    /// Radius at which it reaches transparency
    pub radius: f32,
    /// Alpha at the center after fading
    pub alpha: f32,
}

/// What to draw for one card this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotlightFrame {
    /// Offset tracking state
    pub state: SpotlightState,
    /// `None` once fully faded out
    pub gradient: Option<RadialGradient>,
    /// Rotation around the horizontal axis (degrees)
    pub tilt_x_degrees: f32,
    /// Rotation around the vertical axis (degrees)
    pub tilt_y_degrees: f32,
}

/// Spotlight for a single card
#[derive(Debug, Clone)]
pub struct SpotlightPresenter {
    config: SpotlightConfig,
    card: Rect,
    state: SpotlightState,
    fade: f32,
    tilt_x: Spring,
    tilt_y: Spring,
}

impl SpotlightPresenter {
    /// An inactive spotlight
    pub fn new(config: SpotlightConfig, spring: SpringConfig) -> Self {
        Self {
            config,
            card: Rect::default(),
            state: SpotlightState::default(),
            fade: 0.0,
            tilt_x: Spring::new(0.0, spring),
            tilt_y: Spring::new(0.0, spring),
        }
    }

    /// Current tracking state
    pub fn state(&self) -> SpotlightState {
        self.state
    }

    /// Current fade level in `[0, 1]`
    pub fn fade(&self) -> f32 {
        self.fade
    }

    /// Update with the card's current box and the latest pointer position
    pub fn pointer_moved(&mut self, card: Rect, pointer: Option<Point>) {
        self.card = card;

        match pointer.filter(|p| !card.is_degenerate() && card.contains(*p)) {
            Some(p) => {
                let center = card.center();
                if !self.state.active {
                    trace!("Spotlight entered card at {:?}", card);
                }
                self.state = SpotlightState {
                    offset_x: p.x - center.x,
                    offset_y: p.y - center.y,
                    active: true,
                };
                if self.config.tilt_enabled {
                    let (tilt_x, tilt_y) = self.tilt_for(self.state.offset_x, self.state.offset_y);
                    self.tilt_x.set_target(tilt_x);
                    self.tilt_y.set_target(tilt_y);
                }
            }
            None => {
                if self.state.active {
                    trace!("Spotlight left card at {:?}", card);
                }
                // Keep the last offset so the gradient fades out in place
                self.state.active = false;
                self.tilt_x.set_target(0.0);
                self.tilt_y.set_target(0.0);
            }
        }
    }

    /// Advance the fade and tilt by `dt` seconds
    pub fn step(&mut self, dt: f32) -> SpotlightFrame {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let goal = if self.state.active { 1.0 } else { 0.0 };
        self.fade = if self.config.fade_duration_secs <= 0.0 {
            goal
        } else {
            let rate = dt / self.config.fade_duration_secs;
            if goal > self.fade {
                (self.fade + rate).min(goal)
            } else {
                (self.fade - rate).max(goal)
            }
        };

        let tilt_x_degrees = self.tilt_x.step(dt);
        let tilt_y_degrees = self.tilt_y.step(dt);

        let gradient = (self.fade > 0.0).then(|| {
            let center = self.card.center();
            RadialGradient {
                center: Point::new(
                    center.x + self.state.offset_x,
                    center.y + self.state.offset_y,
                ),
                radius: self.config.radius,
                alpha: self.config.intensity * self.fade,
            }
        });

        SpotlightFrame {
            state: self.state,
            gradient,
            tilt_x_degrees,
            tilt_y_degrees,
        }
    }

    /// Map an offset to `(tilt_x, tilt_y)`: moving down tilts the top away,
    /// moving right tilts the right edge away.
    fn tilt_for(&self, offset_x: f32, offset_y: f32) -> (f32, f32) {
        let range = self.config.tilt_range.max(f32::EPSILON);
        let max = self.config.max_tilt_degrees;
        let x = (-offset_y / range).clamp(-1.0, 1.0) * max;
        let y = (offset_x / range).clamp(-1.0, 1.0) * max;
        (x, y)
    }
}
