//! Shared utilities for the guesswork codebase

use reqwest::Url;
use std::fmt;

/// A string wrapper that masks its contents in Debug/Display output.
/// Prevents accidental logging of API keys.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Intentionally access the raw secret value (for headers, query strings, etc.)
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Models answer "N/A", "unknown" or "null" instead of leaving a field out.
/// Treat those the same as a missing value.
pub fn is_blank_value(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "" | "n/a" | "na" | "null" | "none" | "unknown"
    )
}

/// Like [`is_blank_value`], but also rejects the "still alive" answers that
/// show up in death-place fields.
pub fn is_geocodable(value: &str) -> bool {
    if is_blank_value(value) {
        return false;
    }
    !matches!(
        value.trim().to_lowercase().as_str(),
        "alive" | "still alive" | "living"
    )
}

/// Resolve an `src`/`href` attribute against the page it came from.
/// Protocol-relative URLs get `https:`; anything else is joined onto the page
/// URL. Unparseable input is returned as is.
pub fn absolutize_url(src: &str, page_url: &str) -> String {
    if let Some(rest) = src.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    Url::parse(page_url)
        .and_then(|base| base.join(src))
        .map(String::from)
        .unwrap_or_else(|_| src.to_string())
}
