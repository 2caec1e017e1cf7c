//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the engine.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Generate an opaque check-in token
pub fn generate_qr_code(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Percentage of `part` in `whole`, zero when `whole` is zero
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Replace `{key}` placeholders in a template.
///
/// Substituted values are never scanned again; unknown placeholders are kept as written.
pub fn render_template(template: &str, parameters: &[(&str, String)]) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            parameters
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (value, close))
        });

        match value {
            Some((value, close)) => {
                rendered.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                rendered.push('{');
                rest = after;
            }
        }
    }
    rendered.push_str(rest);

    rendered
}
