//! Spring Interpolator
//!
//! Second-order spring used by every visual follower (cursor position and
//! size, spotlight tilt). One spring animates one scalar.
//!
//! # Physics Model
//!
//! ```text
//! m·x'' = -k·(x - target) - c·x'
//! ```
//!
//! With the default coefficients (`k = 400`, `m = 1`, `c = 40`) the spring is
//! critically damped (`c = 2·√(k·m)`): it reaches the target as fast as
//! possible without oscillating past it. Critically damped springs are
//! advanced with the closed-form solution, so any frame time is stable:
//!
//! ```text
//! x(t) = target + (x₀ + (v₀ + ω·x₀)·t)·e^(-ω·t)      ω = √(k/m)
//! ```
//!
//! Other damping ratios fall back to semi-implicit Euler in sub-steps of at
//! most [`MAX_SUBSTEP_SECS`].
//!
//! Redirecting the target never resets the state: the spring continues from
//! its current value and velocity.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Longest integration step for non-critical springs (seconds)
pub const MAX_SUBSTEP_SECS: f32 = 0.001;

/// Damping ratios this close to 1.0 use the closed-form critical solution
const CRITICAL_TOLERANCE: f32 = 1e-3;

/// Spring coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    /// Stiffness `k`
    #[serde(default = "default_stiffness")]
    pub stiffness: f32,

    /// Damping `c`
    #[serde(default = "default_damping")]
    pub damping: f32,

    /// Mass `m`
    #[serde(default = "default_mass")]
    pub mass: f32,

    /// Displacement and velocity below this snap the spring to its target
    #[serde(default = "default_rest_epsilon")]
    pub rest_epsilon: f32,
}

fn default_stiffness() -> f32 {
    400.0
}
fn default_damping() -> f32 {
    40.0
}
fn default_mass() -> f32 {
    1.0
}
fn default_rest_epsilon() -> f32 {
    0.01
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: default_stiffness(),
            damping: default_damping(),
            mass: default_mass(),
            rest_epsilon: default_rest_epsilon(),
        }
    }
}

impl SpringConfig {
    /// Critically damped coefficients for a given stiffness
    pub fn critical(stiffness: f32) -> Self {
        let mass = default_mass();
        Self {
            stiffness,
            damping: 2.0 * (stiffness * mass).sqrt(),
            mass,
            rest_epsilon: default_rest_epsilon(),
        }
    }

    /// Natural angular frequency `ω = √(k/m)`
    pub fn angular_frequency(&self) -> f32 {
        (self.stiffness / self.mass).sqrt()
    }

    /// Damping at which the spring stops oscillating
    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    /// `ζ = c / (2·√(k·m))`; 1.0 is critical, below oscillates
    pub fn damping_ratio(&self) -> f32 {
        self.damping / self.critical_damping()
    }

    /// Whether the closed-form critical solution applies
    pub fn is_critically_damped(&self) -> bool {
        (self.damping_ratio() - 1.0).abs() < CRITICAL_TOLERANCE
    }
}

/// Output value and velocity of one spring
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpringState {
    /// Current output
    pub value: f32,
    /// Current velocity (units/second)
    pub velocity: f32,
}

impl SpringState {
    /// A spring resting at `value`
    pub const fn at_rest(value: f32) -> Self {
        Self {
            value,
            velocity: 0.0,
        }
    }
}

/// Advance a spring by `dt` seconds toward `target`.
///
/// Non-positive or non-finite `dt` leaves the state untouched.
pub fn step(state: SpringState, target: f32, dt: f32, config: &SpringConfig) -> SpringState {
    if !dt.is_finite() || dt <= 0.0 {
        return state;
    }

    let next = if config.is_critically_damped() {
        step_critical(state, target, dt, config.angular_frequency())
    } else {
        step_substepped(state, target, dt, config)
    };

    settle(next, target, config.rest_epsilon)
}

fn step_critical(state: SpringState, target: f32, dt: f32, omega: f32) -> SpringState {
    let x0 = state.value - target;
    let v0 = state.velocity;
    let b = v0 + omega * x0;
    let decay = (-omega * dt).exp();

    SpringState {
        value: target + (x0 + b * dt) * decay,
        velocity: (v0 - omega * dt * b) * decay,
    }
}

fn step_substepped(
    state: SpringState,
    target: f32,
    dt: f32,
    config: &SpringConfig,
) -> SpringState {
    let steps = (dt / MAX_SUBSTEP_SECS).ceil().max(1.0) as u32;
    let h = dt / steps as f32;

    let mut value = state.value;
    let mut velocity = state.velocity;
    for _ in 0..steps {
        let force = -config.stiffness * (value - target) - config.damping * velocity;
        velocity += force / config.mass * h;
        value += velocity * h;
    }

    SpringState { value, velocity }
}

fn settle(state: SpringState, target: f32, epsilon: f32) -> SpringState {
    if (state.value - target).abs() < epsilon && state.velocity.abs() < epsilon {
        SpringState::at_rest(target)
    } else {
        state
    }
}

/// A restartable spring animating one scalar
#[derive(Debug, Clone)]
pub struct Spring {
    config: SpringConfig,
    state: SpringState,
    target: f32,
}

impl Spring {
    /// A spring resting at `initial`
    pub fn new(initial: f32, config: SpringConfig) -> Self {
        Self {
            config,
            state: SpringState::at_rest(initial),
            target: initial,
        }
    }

    /// Redirect toward a new target, keeping the current value and velocity
    pub fn set_target(&mut self, target: f32) {
        if target != self.target {
            trace!(
                "Spring redirected {:.2} -> {:.2} at value {:.2}",
                self.target,
                target,
                self.state.value
            );
        }
        self.target = target;
    }

    /// Place the spring at rest on `value` (first appearance only)
    pub fn jump_to(&mut self, value: f32) {
        self.state = SpringState::at_rest(value);
        self.target = value;
    }

    /// Advance by `dt` seconds and return the new output
    pub fn step(&mut self, dt: f32) -> f32 {
        self.state = step(self.state, self.target, dt, &self.config);
        self.state.value
    }

    /// Current output
    pub fn value(&self) -> f32 {
        self.state.value
    }

    /// Current velocity
    pub fn velocity(&self) -> f32 {
        self.state.velocity
    }

    /// Current target
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Value and velocity together
    pub fn state(&self) -> SpringState {
        self.state
    }

    /// Whether the spring has settled on its target
    pub fn is_at_rest(&self) -> bool {
        self.state.value == self.target && self.state.velocity == 0.0
    }

    /// Coefficients in use
    pub fn config(&self) -> &SpringConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn test_default_config_is_critical() {
        let config = SpringConfig::default();
        assert_eq!(config.stiffness, 400.0);
        assert_eq!(config.critical_damping(), 40.0);
        assert!(config.is_critically_damped());
    }

    #[test]
    fn test_converges_without_overshoot() {
        let mut spring = Spring::new(0.0, SpringConfig::default());
        spring.set_target(100.0);

        let mut previous = 0.0;
        for _ in 0..120 {
            let value = spring.step(FRAME);
            assert!(value <= 100.0, "overshot: {}", value);
            assert!(value >= previous, "went backwards: {} < {}", value, previous);
            previous = value;
        }
        assert!(spring.is_at_rest(), "not settled: {:?}", spring.state());
        assert_eq!(spring.value(), 100.0);
    }

    #[test]
    fn test_redirect_is_continuous() {
        let mut spring = Spring::new(0.0, SpringConfig::default());
        spring.set_target(100.0);
        for _ in 0..5 {
            spring.step(FRAME);
        }
        let before = spring.state();

        spring.set_target(-50.0);
        assert_eq!(spring.state(), before, "redirect must not move the output");

        let after = spring.step(FRAME);
        assert!((after - before.value).abs() < 20.0, "jumped to {}", after);
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let state = SpringState {
            value: 3.0,
            velocity: 1.0,
        };
        let config = SpringConfig::default();
        assert_eq!(step(state, 10.0, 0.0, &config), state);
        assert_eq!(step(state, 10.0, -1.0, &config), state);
        assert_eq!(step(state, 10.0, f32::NAN, &config), state);
    }

    #[test]
    fn test_large_dt_is_stable() {
        let config = SpringConfig::default();
        let state = step(SpringState::at_rest(0.0), 500.0, 5.0, &config);
        assert_eq!(state, SpringState::at_rest(500.0));
    }

    #[test]
    fn test_underdamped_spring_still_converges() {
        let config = SpringConfig {
            stiffness: 400.0,
            damping: 25.0,
            ..SpringConfig::default()
        };
        assert!(config.damping_ratio() < 1.0);

        let mut spring = Spring::new(0.0, config);
        spring.set_target(10.0);
        for _ in 0..600 {
            spring.step(FRAME);
        }
        assert!((spring.value() - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_jump_to_rests_immediately() {
        let mut spring = Spring::new(0.0, SpringConfig::default());
        spring.set_target(50.0);
        spring.step(FRAME);
        spring.jump_to(7.0);
        assert!(spring.is_at_rest());
        assert_eq!(spring.step(FRAME), 7.0);
    }
}
