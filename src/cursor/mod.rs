//! Custom targeting cursor
//!
//! The page replaces the native pointer with a drawn cursor that has two
//! visual modes:
//!
//! | State | Drawn as | Follows |
//! |-------|----------|---------|
//! | Idle | Spinning ring | Pointer position |
//! | Framing | Four corner brackets | Target box + inset |
//!
//! # Architecture
//!
//! ```text
//! Pointer samples
//!   └─> TargetResolver (innermost candidate, fresh box)
//!       └─> TargetEvent
//!           └─> CursorPresenter
//!               ├─> state machine (Idle | Framing)
//!               ├─> springs (left, top, width, height)
//!               └─> CursorFrame (what to draw)
//! ```

mod presenter;

pub use presenter::{CornerBracket, CursorConfig, CursorFrame, CursorPresenter, CursorVisualState};

/// Default seconds per idle ring revolution
pub const DEFAULT_SPIN_DURATION_SECS: f32 = 2.0;

/// Default margin around a framed target (pixels)
pub const DEFAULT_FRAME_INSET: f32 = 10.0;
