//! Small presentation helpers shared by the API and its view models.

use chrono::{DateTime, Utc};

/// Initials for an avatar fallback: the first letter of up to two words,
/// uppercased. Empty or whitespace-only names yield `"?"`.
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();

    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

/// Relative "time ago" label for `at`, measured from `now`.
///
/// Timestamps in the future are treated as "just now".
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    let minutes = elapsed.num_minutes();

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if elapsed.num_hours() < 24 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_days() < 7 {
        format!("{}d ago", elapsed.num_days())
    } else {
        at.format("%b %-d, %Y").to_string()
    }
}

/// Month-and-year label used for a community's founding date.
pub fn founded_label(at: DateTime<Utc>) -> String {
    at.format("%B %Y").to_string()
}
