//! Utility Functions
//!
//! User-friendly error reporting for the binaries.
//!
//! ```rust,ignore
//! use prism_folio::utils::format_user_error;
//!
//! if let Err(e) = run() {
//!     eprintln!("{}", format_user_error(&e));
//! }
//! ```
//!
//! Error categories with context-aware help:
//! - Config errors → Syntax validation, value ranges, selector syntax
//! - Content errors → Missing file, duplicate ids, skill levels
//! - Preference errors → Corrupt JSON, unwritable directory
//! - Trace errors → Expected JSON layout

pub mod errors;

pub use errors::{categorize, format_user_error, ErrorCategory};
