//! ZIP code extraction from free-form address strings.

use regex::Regex;
use std::sync::OnceLock;

/// Five digits with an optional plus-four, on word boundaries. There is
/// no perfect pattern for free-form addresses; this variant matches with
/// the fewest valid exceptions.
const ZIP_PATTERN: &str = r"\b\d{5}(-\d{4})?\b";

fn zip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ZIP_PATTERN).expect("zip pattern is valid"))
}

/// Pull a ZIP code out of an address string.
///
/// A match at the very start of the string is skipped: a five-digit
/// house number would otherwise masquerade as the postal code.
pub fn extract_zip(address: &str) -> Option<&str> {
    zip_regex()
        .find_iter(address)
        .find(|m| m.start() > 0)
        .map(|m| m.as_str())
}
