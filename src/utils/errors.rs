//! User-Friendly Error Formatting
//!
//! Provides user-friendly error messages with troubleshooting hints
//! for common error scenarios.

use std::fmt::Write;

use crate::content::ContentError;
use crate::theme::PreferenceError;
use crate::trace::TraceError;

/// What kind of failure an error chain represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Config file missing, malformed or invalid
    Config,
    /// Content file missing or invalid
    Content,
    /// Theme preference file unreadable or unwritable
    Preferences,
    /// Pointer trace missing or malformed
    Trace,
    /// Anything else
    Other,
}

/// Classify an error by the typed errors in its chain, falling back to the
/// message text
pub fn categorize(error: &anyhow::Error) -> ErrorCategory {
    for cause in error.chain() {
        if cause.is::<ContentError>() {
            return ErrorCategory::Content;
        }
        if cause.is::<PreferenceError>() {
            return ErrorCategory::Preferences;
        }
        if cause.is::<TraceError>() {
            return ErrorCategory::Trace;
        }
    }

    let message = error.to_string();
    if message.contains("config") {
        ErrorCategory::Config
    } else if message.contains("content") {
        ErrorCategory::Content
    } else if message.contains("preference") {
        ErrorCategory::Preferences
    } else if message.contains("trace") {
        ErrorCategory::Trace
    } else {
        ErrorCategory::Other
    }
}

/// Format error for user consumption
///
/// Takes technical error and produces user-friendly message with
/// troubleshooting steps and context.
pub fn format_user_error(error: &anyhow::Error) -> String {
    let mut output = String::new();

    // Header
    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "╔════════════════════════════════════════════════════════════╗"
    )
    .ok();
    writeln!(
        &mut output,
        "║                     ERROR                                  ║"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();
    writeln!(&mut output).ok();

    match categorize(error) {
        ErrorCategory::Config => format_config_error(&mut output),
        ErrorCategory::Content => format_content_error(&mut output),
        ErrorCategory::Preferences => format_preferences_error(&mut output),
        ErrorCategory::Trace => format_trace_error(&mut output),
        ErrorCategory::Other => format_generic_error(&mut output, &error.to_string()),
    }

    // Technical details
    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Technical Details:").ok();
    writeln!(&mut output).ok();
    writeln!(&mut output, "{:#}", error).ok();
    writeln!(&mut output).ok();

    // Footer with help
    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Need Help?").ok();
    writeln!(
        &mut output,
        "  - Run with --verbose for detailed logs: prism-folio -vv"
    )
    .ok();
    writeln!(
        &mut output,
        "  - Print the effective configuration: prism-folio config"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();

    output
}

fn format_config_error(output: &mut String) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "The configuration file could not be used.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. TOML syntax error").ok();
    writeln!(output, "     → Check quotes, brackets and section headers").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Value out of range").ok();
    writeln!(
        output,
        "     → Durations, sizes and spring coefficients must be positive"
    )
    .ok();
    writeln!(output, "     → frame.refresh_hz must be between 1 and 240").ok();
    writeln!(output).ok();
    writeln!(output, "  3. Unsupported target selector").ok();
    writeln!(
        output,
        "     → Use a single class selector such as \".cursor-target\""
    )
    .ok();
}

fn format_content_error(output: &mut String) {
    writeln!(output, "Content Error").ok();
    writeln!(output).ok();
    writeln!(output, "The portfolio content could not be loaded.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. [content] path points to a missing file").ok();
    writeln!(
        output,
        "     → Remove the setting to use the bundled content"
    )
    .ok();
    writeln!(output).ok();
    writeln!(output, "  2. Duplicate ids").ok();
    writeln!(
        output,
        "     → Every experience, project and skill category needs a unique id"
    )
    .ok();
    writeln!(output).ok();
    writeln!(output, "  3. Skill level outside 0-100").ok();
}

fn format_preferences_error(output: &mut String) {
    writeln!(output, "Theme Preference Error").ok();
    writeln!(output).ok();
    writeln!(output, "The theme preference file could not be read or written.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. File is not valid JSON").ok();
    writeln!(output, "     → Delete it; it is recreated on the next change").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Directory is not writable").ok();
    writeln!(
        output,
        "     → Set [theme] preferences_path to a writable location"
    )
    .ok();
}

fn format_trace_error(output: &mut String) {
    writeln!(output, "Pointer Trace Error").ok();
    writeln!(output).ok();
    writeln!(output, "The pointer trace could not be replayed.").ok();
    writeln!(output).ok();
    writeln!(output, "Expected Format:").ok();
    writeln!(output).ok();
    writeln!(
        output,
        "  {{ \"samples\": [ {{ \"t\": 0.0, \"x\": 10, \"y\": 20 }}, ... ] }}"
    )
    .ok();
    writeln!(output).ok();
    writeln!(output, "  - t is in seconds and must not decrease").ok();
    writeln!(output, "  - traces may last at most one hour").ok();
    writeln!(output, "  - x and y are viewport pixels").ok();
}

fn format_generic_error(output: &mut String, error: &str) {
    writeln!(output, "Operation Failed").ok();
    writeln!(output).ok();
    writeln!(output, "{}", error).ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_categorize_by_type() {
        let err = anyhow::Error::new(ContentError::Missing("personal.name")).context("Failed to start");
        assert_eq!(categorize(&err), ErrorCategory::Content);

        let err: anyhow::Result<()> = Err(TraceError::OutOfOrder { index: 1, t: 0.0 }).context("replay");
        assert_eq!(categorize(&err.unwrap_err()), ErrorCategory::Trace);
    }

    #[test]
    fn test_categorize_by_message() {
        let err = anyhow::anyhow!("Failed to parse config file");
        assert_eq!(categorize(&err), ErrorCategory::Config);
        assert_eq!(categorize(&anyhow::anyhow!("boom")), ErrorCategory::Other);
    }

    #[test]
    fn test_report_includes_details() {
        let err = anyhow::anyhow!("boom");
        let report = format_user_error(&err);
        assert!(report.contains("Operation Failed"));
        assert!(report.contains("Technical Details:"));
        assert!(report.contains("boom"));
    }
}
