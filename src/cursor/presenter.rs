//! Cursor presenter state machine
//!
//! ```text
//!            Entered / Moved
//!   ┌──────┐ ─────────────────> ┌─────────┐
//!   │ Idle │                    │ Framing │ <─┐ Entered / Moved
//!   └──────┘ <───────────────── └─────────┘ ──┘
//!                  Left
//! ```
//!
//! Transitions come only from [`TargetEvent`]s. The drawn box always goes
//! through four springs (left, top, width, height), so switching state
//! morphs the ring into the brackets instead of snapping.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::{Point, Rect};
use crate::layout::ElementKey;
use crate::spring::{Spring, SpringConfig};
use crate::target::{TargetEvent, DEFAULT_TARGET_CLASS};

/// Configuration for the custom cursor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorConfig {
    /// Selector marking target candidates
    #[serde(default = "default_target_selector")]
    pub target_selector: String,

    /// Seconds for one full turn of the idle ring
    #[serde(default = "default_spin_duration")]
    pub spin_duration_secs: f32,

    /// Hide the native pointer while framing a target
    #[serde(default = "default_true")]
    pub hide_native_cursor: bool,

    /// Margin added on every side of a framed box (pixels)
    #[serde(default = "default_inset")]
    pub inset: f32,

    /// Diameter of the idle ring (pixels)
    #[serde(default = "default_ring_size")]
    pub ring_size: f32,

    /// Arm length of each corner bracket (pixels)
    #[serde(default = "default_corner_size")]
    pub corner_size: f32,
}

fn default_target_selector() -> String {
    format!(".{}", DEFAULT_TARGET_CLASS)
}
fn default_spin_duration() -> f32 {
    2.0
}
fn default_true() -> bool {
    true
}
fn default_inset() -> f32 {
    10.0
}
fn default_ring_size() -> f32 {
    40.0
}
fn default_corner_size() -> f32 {
    12.0
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            target_selector: default_target_selector(),
            spin_duration_secs: default_spin_duration(),
            hide_native_cursor: default_true(),
            inset: default_inset(),
            ring_size: default_ring_size(),
            corner_size: default_corner_size(),
        }
    }
}

/// What the cursor is doing this frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CursorVisualState {
    /// Free-floating ring following the pointer
    Idle {
        /// Raw pointer position the ring is chasing
        position: Point,
    },
    /// Brackets around a resolved target
    Framing {
        /// Target box already inflated by the inset
        bounding_box: Rect,
        /// Element being framed
        target: ElementKey,
    },
}

impl CursorVisualState {
    /// Whether the cursor is in the idle state
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle { .. })
    }

    /// Whether the cursor is framing a target
    pub fn is_framing(&self) -> bool {
        matches!(self, Self::Framing { .. })
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle { .. } => "idle",
            Self::Framing { .. } => "framing",
        }
    }
}

/// One corner bracket, drawn as two arms meeting at `corner`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerBracket {
    /// Point where the arms meet
    pub corner: Point,
    /// End of the horizontal arm
    pub horizontal_end: Point,
    /// End of the vertical arm
    pub vertical_end: Point,
    /// Pulse opacity in `[0.5, 1.0]`
    pub opacity: f32,
}

/// Everything needed to draw the cursor for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorFrame {
    /// Logical state
    pub state: CursorVisualState,
    /// Interpolated box being drawn
    pub rect: Rect,
    /// Ring rotation in degrees (idle only, 0 while framing)
    pub rotation_degrees: f32,
    /// Brackets to draw (empty while idle)
    pub corners: Vec<CornerBracket>,
    /// Whether the host should hide its native pointer
    pub native_cursor_hidden: bool,
    /// False until the first pointer sample arrives
    pub visible: bool,
}

#[derive(Debug, Clone)]
struct RectSprings {
    left: Spring,
    top: Spring,
    width: Spring,
    height: Spring,
}

impl RectSprings {
    fn new(rect: Rect, config: SpringConfig) -> Self {
        Self {
            left: Spring::new(rect.left, config),
            top: Spring::new(rect.top, config),
            width: Spring::new(rect.width, config),
            height: Spring::new(rect.height, config),
        }
    }

    fn set_target(&mut self, rect: Rect) {
        self.left.set_target(rect.left);
        self.top.set_target(rect.top);
        self.width.set_target(rect.width);
        self.height.set_target(rect.height);
    }

    fn jump_to(&mut self, rect: Rect) {
        self.left.jump_to(rect.left);
        self.top.jump_to(rect.top);
        self.width.jump_to(rect.width);
        self.height.jump_to(rect.height);
    }

    fn step(&mut self, dt: f32) -> Rect {
        Rect::new(
            self.left.step(dt),
            self.top.step(dt),
            self.width.step(dt),
            self.height.step(dt),
        )
    }

    fn current(&self) -> Rect {
        Rect::new(
            self.left.value(),
            self.top.value(),
            self.width.value(),
            self.height.value(),
        )
    }
}

/// The global custom cursor
#[derive(Debug, Clone)]
pub struct CursorPresenter {
    config: CursorConfig,
    state: CursorVisualState,
    springs: RectSprings,
    rotation_degrees: f32,
    pulse_secs: f32,
    pointer: Option<Point>,
}

impl CursorPresenter {
    /// A hidden idle cursor; it appears on the first pointer sample
    pub fn new(config: CursorConfig, spring: SpringConfig) -> Self {
        let origin = Point::default();
        let ring = Rect::centered_on(origin, config.ring_size, config.ring_size);
        Self {
            springs: RectSprings::new(ring, spring),
            state: CursorVisualState::Idle { position: origin },
            rotation_degrees: 0.0,
            pulse_secs: 0.0,
            pointer: None,
            config,
        }
    }

    /// Current logical state
    pub fn state(&self) -> &CursorVisualState {
        &self.state
    }

    /// Configuration in use
    pub fn config(&self) -> &CursorConfig {
        &self.config
    }

    /// Feed the latest pointer position.
    ///
    /// While idle the ring chases it; while framing only the remembered
    /// position changes so leaving the target returns to the right place.
    pub fn set_pointer(&mut self, position: Point) {
        if self.pointer.is_none() && self.state.is_idle() {
            self.springs.jump_to(self.ring_at(position));
        }
        self.pointer = Some(position);

        if let CursorVisualState::Idle { position: current } = &mut self.state {
            *current = position;
            let ring = self.ring_at(position);
            self.springs.set_target(ring);
        }
    }

    /// Apply a resolver event
    pub fn handle_event(&mut self, event: &TargetEvent) {
        match event {
            TargetEvent::Entered(region) | TargetEvent::Moved(region) => {
                let framed = region.bounding_box.inflate(self.config.inset);
                if self.state.is_idle() {
                    debug!("Cursor idle -> framing {}", region.source_element);
                    self.pulse_secs = 0.0;
                }
                self.state = CursorVisualState::Framing {
                    bounding_box: framed,
                    target: region.source_element.clone(),
                };
                self.springs.set_target(framed);
            }
            TargetEvent::Left { previous } => {
                if self.state.is_framing() {
                    debug!("Cursor framing -> idle (left {})", previous);
                }
                let position = self
                    .pointer
                    .unwrap_or_else(|| self.springs.current().center());
                self.state = CursorVisualState::Idle { position };
                let ring = self.ring_at(position);
                self.springs.set_target(ring);
            }
        }
    }

    /// Advance animations by `dt` seconds and describe the frame
    pub fn step(&mut self, dt: f32) -> CursorFrame {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let rect = self.springs.step(dt);

        let framing = self.state.is_framing();
        if framing {
            self.rotation_degrees = 0.0;
            self.pulse_secs += dt;
        } else {
            let degrees_per_sec = 360.0 / self.config.spin_duration_secs;
            self.rotation_degrees = (self.rotation_degrees + degrees_per_sec * dt) % 360.0;
        }

        CursorFrame {
            state: self.state.clone(),
            rect,
            rotation_degrees: self.rotation_degrees,
            corners: if framing { self.corners(rect) } else { Vec::new() },
            native_cursor_hidden: framing && self.config.hide_native_cursor,
            visible: self.pointer.is_some(),
        }
    }

    fn ring_at(&self, position: Point) -> Rect {
        Rect::centered_on(position, self.config.ring_size, self.config.ring_size)
    }

    fn corners(&self, rect: Rect) -> Vec<CornerBracket> {
        let arm = self.config.corner_size.min(rect.width / 2.0).min(rect.height / 2.0);
        let period = self.config.spin_duration_secs;

        // Clockwise from top-left; each corner pulses a quarter period later
        let anchors = [
            (Point::new(rect.left, rect.top), 1.0, 1.0),
            (Point::new(rect.right(), rect.top), -1.0, 1.0),
            (Point::new(rect.right(), rect.bottom()), -1.0, -1.0),
            (Point::new(rect.left, rect.bottom()), 1.0, -1.0),
        ];

        anchors
            .iter()
            .enumerate()
            .map(|(i, (corner, dx, dy))| {
                let phase = self.pulse_secs / period + i as f32 * 0.25;
                CornerBracket {
                    corner: *corner,
                    horizontal_end: Point::new(corner.x + dx * arm, corner.y),
                    vertical_end: Point::new(corner.x, corner.y + dy * arm),
                    opacity: 0.75 - 0.25 * (TAU * phase).cos(),
                }
            })
            .collect()
    }
}
