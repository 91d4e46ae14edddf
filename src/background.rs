//! Pointer-driven hero background
//!
//! The hero backdrop follows the pointer with a faint radial gradient. Its
//! center is the pointer position normalized to the viewport (`0..=1` on
//! each axis) and stays put when the pointer leaves. A few orbs drift on
//! fixed loops and the whole layer breathes between 80% and full opacity.
//!
//! Orb placement is derived from the orb index, so every run and every
//! re-layout draws the same backdrop.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geometry::{Point, Viewport};

/// Drift offsets (pixels) and scale along one orb loop
const ORB_X: [f32; 4] = [0.0, 30.0, -20.0, 0.0];
const ORB_Y: [f32; 4] = [0.0, -20.0, 30.0, 0.0];
const ORB_SCALE: [f32; 4] = [1.0, 1.1, 0.9, 1.0];

/// Opacity along one breathing cycle
const PULSE: [f32; 3] = [0.8, 1.0, 0.8];

/// Seconds between consecutive orbs starting to drift
const ORB_STAGGER_SECS: f32 = 2.0;

/// Configuration for the hero background
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundConfig {
    /// Draw the background at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Number of drifting orbs
    #[serde(default = "default_orb_count")]
    pub orb_count: usize,

    /// Seconds per breathing cycle
    #[serde(default = "default_pulse_secs")]
    pub pulse_secs: f32,

    /// Shortest orb loop in seconds; later orbs take up to half as long again
    #[serde(default = "default_orb_period")]
    pub orb_period_secs: f32,
}

fn default_true() -> bool {
    true
}
fn default_orb_count() -> usize {
    5
}
fn default_pulse_secs() -> f32 {
    8.0
}
fn default_orb_period() -> f32 {
    20.0
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            orb_count: default_orb_count(),
            pulse_secs: default_pulse_secs(),
            orb_period_secs: default_orb_period(),
        }
    }
}

/// One drifting orb
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orb {
    /// Resting position as a fraction of the hero box
    pub anchor: Point,
    /// Current drift from the anchor (pixels)
    pub offset: Point,
    /// Current radius (pixels)
    pub radius: f32,
}

/// What to draw behind the hero this frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundFrame {
    /// Gradient center, normalized to the viewport
    pub center: Point,
    /// Layer opacity in `[0.8, 1]`
    pub opacity: f32,
    /// Orbs in index order
    pub orbs: Vec<Orb>,
}

/// Fractional part of a golden-ratio style sequence
fn spread(i: usize, step: f32, start: f32) -> f32 {
    (start + i as f32 * step).fract()
}

fn ease_in_out(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Sample evenly spaced keyframes at `phase` in `[0, 1)`
fn keyframe(frames: &[f32], phase: f32) -> f32 {
    let segments = (frames.len() - 1) as f32;
    let position = phase.clamp(0.0, 1.0) * segments;
    let index = (position.floor() as usize).min(frames.len() - 2);
    let local = ease_in_out(position - index as f32);
    frames[index] + (frames[index + 1] - frames[index]) * local
}

/// Background state for one page
#[derive(Debug, Clone)]
pub struct BackgroundPresenter {
    config: BackgroundConfig,
    center: Point,
    elapsed_secs: f32,
}

impl BackgroundPresenter {
    /// A background centered on the top-left corner until the pointer moves
    pub fn new(config: BackgroundConfig) -> Self {
        Self {
            config,
            center: Point::default(),
            elapsed_secs: 0.0,
        }
    }

    /// Normalized gradient center
    pub fn center(&self) -> Point {
        self.center
    }

    /// Follow the latest pointer sample
    pub fn pointer_moved(&mut self, viewport: Viewport, pointer: Option<Point>) {
        let Some(pointer) = pointer else { return };
        if viewport.width <= 0.0 || viewport.height <= 0.0 {
            return;
        }
        self.center = Point::new(
            (pointer.x / viewport.width).clamp(0.0, 1.0),
            (pointer.y / viewport.height).clamp(0.0, 1.0),
        );
    }

    /// Advance the drift clock; `None` when disabled
    pub fn step(&mut self, dt: f32) -> Option<BackgroundFrame> {
        if !self.config.enabled {
            return None;
        }
        if dt.is_finite() && dt > 0.0 {
            self.elapsed_secs += dt;
        }

        let pulse_phase = (self.elapsed_secs / self.config.pulse_secs).fract();
        let opacity = keyframe(&PULSE, pulse_phase);
        let orbs = (0..self.config.orb_count).map(|i| self.orb(i)).collect();
        trace!("Background at ({:.2}, {:.2})", self.center.x, self.center.y);

        Some(BackgroundFrame {
            center: self.center,
            opacity,
            orbs,
        })
    }

    fn orb(&self, i: usize) -> Orb {
        let anchor = Point::new(spread(i, 0.618_034, 0.1), spread(i, 0.414_214, 0.3));
        let size = 100.0 + 200.0 * spread(i, 0.754_878, 0.2);
        let period = self.config.orb_period_secs * (1.0 + 0.5 * spread(i, 0.381_966, 0.5));

        let running = self.elapsed_secs - i as f32 * ORB_STAGGER_SECS;
        let phase = if running > 0.0 { (running / period).fract() } else { 0.0 };

        Orb {
            anchor,
            offset: Point::new(keyframe(&ORB_X, phase), keyframe(&ORB_Y, phase)),
            radius: size / 2.0 * keyframe(&ORB_SCALE, phase),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 1280.0,
        height: 800.0,
    };

    #[test]
    fn test_center_follows_normalized_pointer() {
        let mut background = BackgroundPresenter::new(BackgroundConfig::default());
        assert_eq!(background.step(0.0).unwrap().center, Point::new(0.0, 0.0));

        background.pointer_moved(VIEWPORT, Some(Point::new(640.0, 200.0)));
        assert_eq!(background.step(0.016).unwrap().center, Point::new(0.5, 0.25));

        // Leaving keeps the last position; off-window samples are clamped
        background.pointer_moved(VIEWPORT, None);
        assert_eq!(background.center(), Point::new(0.5, 0.25));
        background.pointer_moved(VIEWPORT, Some(Point::new(2000.0, -10.0)));
        assert_eq!(background.center(), Point::new(1.0, 0.0));
    }

    #[test]
    fn test_pulse_breathes_between_bounds() {
        let mut background = BackgroundPresenter::new(BackgroundConfig::default());
        assert!((background.step(0.0).unwrap().opacity - 0.8).abs() < 1e-6);
        assert!((background.step(4.0).unwrap().opacity - 1.0).abs() < 1e-6);
        for _ in 0..100 {
            let opacity = background.step(0.1).unwrap().opacity;
            assert!((0.8..=1.0).contains(&opacity));
        }
    }

    #[test]
    fn test_orbs_are_stable_and_staggered() {
        let mut a = BackgroundPresenter::new(BackgroundConfig::default());
        let mut b = BackgroundPresenter::new(BackgroundConfig::default());
        let frame = a.step(1.0).unwrap();
        assert_eq!(frame, b.step(1.0).unwrap());
        assert_eq!(frame.orbs.len(), 5);

        for orb in &frame.orbs {
            assert!((0.0..1.0).contains(&orb.anchor.x) && (0.0..1.0).contains(&orb.anchor.y));
            assert!(orb.radius >= 50.0 * 0.9 && orb.radius <= 150.0 * 1.1);
        }
        // Only the first orb has started drifting after one second
        assert_ne!(frame.orbs[0].offset, Point::default());
        assert_eq!(frame.orbs[1].offset, Point::default());
    }

    #[test]
    fn test_disabled_draws_nothing() {
        let config = BackgroundConfig {
            enabled: false,
            ..BackgroundConfig::default()
        };
        let mut background = BackgroundPresenter::new(config);
        background.pointer_moved(VIEWPORT, Some(Point::new(10.0, 10.0)));
        assert_eq!(background.step(0.016), None);
    }
}
