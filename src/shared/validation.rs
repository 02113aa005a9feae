use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating slug fields (doc unique slug, category slug)
    /// Must be lowercase alphanumeric with hyphens
    /// - Valid: "button", "primary-button", "card2"
    /// - Invalid: "-button", "button-", "button--big", "Button", "button_big"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Derive a URL-safe slug from free text.
///
/// Returns `fallback` when nothing alphanumeric survives.
pub fn slugify(input: &str, fallback: &str) -> String {
    let lowered = input.to_lowercase();
    let slug = NON_SLUG_CHARS.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');

    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug.to_string()
    }
}

/// Column width of `docs.unique_slug` and `categories.slug`
pub const MAX_SLUG_LEN: usize = 255;

/// Longest suffix an attempt adds: "-" plus the digits of `u32::MAX`
const MAX_SUFFIX_LEN: usize = 11;

fn truncate_chars(s: &str, max: usize) -> &str {
    s.char_indices().nth(max).map_or(s, |(i, _)| &s[..i])
}

/// The `attempt`-th slug to try for `base`: "base", then "base-2", "base-3", ...
///
/// `base` is cut so the result never exceeds `MAX_SLUG_LEN`.
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    let suffix = if attempt <= 1 {
        String::new()
    } else {
        format!("-{}", attempt)
    };
    let head = truncate_chars(base, MAX_SLUG_LEN - suffix.len()).trim_end_matches('-');
    format!("{}{}", head, suffix)
}

/// Prefix shared by every candidate of `base`
pub fn slug_stem(base: &str) -> &str {
    truncate_chars(base, MAX_SLUG_LEN - MAX_SUFFIX_LEN - 1)
}

/// First candidate of `base` not in `taken`
pub fn first_free_slug(base: &str, taken: &HashSet<String>) -> String {
    let mut attempt = 1;
    loop {
        let candidate = slug_candidate(base, attempt);
        if !taken.contains(&candidate) {
            return candidate;
        }
        attempt += 1;
    }
}
