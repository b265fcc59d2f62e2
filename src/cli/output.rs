//! Status messages for the immediate-exit actions and top-level errors
//!
//! Build output never goes through here; it belongs to the bound logger.

use std::fmt::Display;

/// Status message prefixes
pub mod status {
    /// Success prefix (checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (circle)
    pub const INFO: &str = "ℹ";
}

/// Format a prefixed status line
pub fn status_line(prefix: &str, message: &str) -> String {
    format!("{prefix} {message}")
}

pub fn print_success(message: &str) {
    println!("{}", status_line(status::SUCCESS, message));
}

pub fn print_info(message: &str) {
    println!("{}", status_line(status::INFO, message));
}

pub fn print_warning(message: &str) {
    eprintln!("{}", status_line(status::WARNING, message));
}

/// Indented detail under a status line
pub fn print_detail(message: &str) {
    println!("  {message}");
}

/// Print an error raised before any output stream exists
pub fn print_error(error: &dyn Display) {
    eprintln!("{error}");
}
