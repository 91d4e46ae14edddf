//! # prism-folio
//!
//! Single-page personal portfolio with a spring-driven targeting cursor and
//! pointer-following spotlight cards.
//!
//! The interactive core is independent of any renderer:
//! - [`pointer`] - Pointer position broadcast and per-consumer tracking
//! - [`spring`] - Critically damped spring interpolation
//! - [`target`] - Pointer → innermost tagged element resolution
//! - [`cursor`] - Custom cursor state machine (idle ring / framing brackets)
//! - [`spotlight`] - Per-card radial highlight and tilt
//! - [`background`] - Hero backdrop following the normalized pointer
//!
//! Around it sit the page itself:
//! - [`content`] - Portfolio data (bundled TOML)
//! - [`page`] - Responsive layout of the page into a [`layout::LayoutTree`]
//! - [`contact`] - Contact form validation and mailto links
//! - [`theme`] - Light/dark/system preference, persisted across runs
//!
//! # Architecture
//!
//! ```text
//! PointerHub ──> PointerTracker ──┬─> TargetResolver ──> CursorPresenter
//!                                 ├─> SpotlightPresenter (one per card)
//!                                 └─> BackgroundPresenter
//!                                             │
//!                       Scene::advance(dt) ───┴─> FrameSnapshot
//! ```
//!
//! # Frame Order
//!
//! Every frame: drain pointer → resolve target → update cursor →
//! step springs → update spotlights → update background. See [`scene::Scene::advance`].

#![warn(missing_docs)]
#![warn(clippy::all)]

// =============================================================================
// Interactive core
// =============================================================================

/// Pointer position tracking
pub mod pointer;

/// Spring interpolation
pub mod spring;

/// Cursor target resolution
pub mod target;

/// Custom cursor presentation
pub mod cursor;

/// Card spotlight presentation
pub mod spotlight;

/// Pointer-driven hero background
pub mod background;

/// Frame orchestration
pub mod scene;

/// Pointer trace replay
pub mod trace;

// =============================================================================
// Page
// =============================================================================

/// Points, rectangles and viewports
pub mod geometry;

/// Element tree with bounding boxes and hit testing
pub mod layout;

/// Portfolio content
pub mod content;

/// Page layout
pub mod page;

/// Contact form
pub mod contact;

/// Theme preference and palettes
pub mod theme;

// =============================================================================
// Support
// =============================================================================

/// Configuration
pub mod config;

/// Utility functions
pub mod utils;

/// Desktop rendition (iced)
#[cfg(feature = "gui")]
pub mod gui;

pub use config::Config;
pub use scene::{FrameSnapshot, Scene, SceneSettings};
