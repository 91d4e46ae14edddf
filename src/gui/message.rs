//! GUI Message types for the prism-folio window
//!
//! All user interactions and clock events are represented as messages.

use std::time::Instant;

use crate::geometry::{Point, Viewport};

/// Main application message type
#[derive(Debug, Clone)]
pub enum Message {
    // =========================================================================
    // Pointer
    // =========================================================================
    /// Pointer moved inside the page (page coordinates)
    PointerMoved(Point),
    /// Pointer left the page
    PointerLeft,
    /// Left button pressed at a page position
    Pressed(Point),
    /// Wheel scrolled by this many pixels (positive scrolls down)
    Scrolled(f32),

    // =========================================================================
    // Window
    // =========================================================================
    /// Page area changed size
    Resized(Viewport),
    /// Display refresh
    Frame(Instant),
    /// Periodic housekeeping (system appearance, theme changes)
    Tick,

    // =========================================================================
    // Keyboard (contact form)
    // =========================================================================
    /// Key typed while a form field has focus
    Key(KeyInput),

    // =========================================================================
    // Status bar
    // =========================================================================
    /// Toggle between light and dark
    ToggleTheme,
    /// Dismiss the status message
    DismissStatus,

    // =========================================================================
    // External
    // =========================================================================
    /// Browser or mail client launched (or failed to)
    Opened(Result<(), String>),
}

/// Editing actions for the focused contact field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable text
    Text(String),
    /// Delete the last character
    Backspace,
    /// Move focus to the next field
    NextField,
    /// Enter; a newline in the message, submit elsewhere
    Enter,
    /// Drop focus
    Escape,
}
