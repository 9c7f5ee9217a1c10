//! Canonical brand keys.
//!
//! Branch listings of one brand differ in the qualifiers appended to the
//! name ("Sharma Cafe - Sector 12", "Sharma's Cafe #3"). [`normalize`] strips
//! those qualifiers so that every branch maps to the same key.

use std::sync::LazyLock;

use regex::Regex;

/// Number of leading tokens kept in a brand key.
pub const DEFAULT_KEY_TOKENS: usize = 3;

const POSSESSIVE_MARKERS: [&str; 4] = ["'s", "\u{2019}s", "'", "\u{2019}"];

/// Branch-qualifier patterns, applied in order to the lower-cased name.
static BRANCH_QUALIFIERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Everything after the first dash or comma.
        r"(?s)\s*-\s*.*",
        r"(?s)\s*,\s*.*",
        // Branch numbers: "#3".
        r"\s*#\d+",
        r"(?s)\s*\(.*\)",
        r"\s+branch\b\s*\d*",
        r"\s+outlet\b\s*\d*",
        r"\s+store\b\s*\d*",
        r"\s+shop\b\s*\d*",
        r"\s+sector\s+\d+",
        r"\s+phase\s+\d+",
        r"\s+scf\s+\d+",
        r"\s+sco\s+\d+",
        r"\s+block\s+\w+",
        r"(?s)\s+mall\b.*",
        r"(?s)\s+market\b.*",
        r"(?s)\s+plaza\b.*",
        r"(?s)\s+complex\b.*",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid branch qualifier regex"))
    .collect()
});

/// Canonical brand key for `name`, keeping [`DEFAULT_KEY_TOKENS`] tokens.
///
/// Never fails; empty input yields an empty key.
#[must_use]
pub fn normalize(name: &str) -> String {
    normalize_with_tokens(name, DEFAULT_KEY_TOKENS)
}

/// Canonical brand key for `name`, keeping at most `key_tokens` tokens.
///
/// The strip pass is repeated until the key stops changing, so the result is
/// a fixed point: normalizing a key returns the key unchanged.
#[must_use]
pub fn normalize_with_tokens(name: &str, key_tokens: usize) -> String {
    let mut key = strip_pass(name, key_tokens);
    // Each pass only removes text, so this terminates.
    loop {
        let next = strip_pass(&key, key_tokens);
        if next == key {
            return key;
        }
        key = next;
    }
}

fn strip_pass(name: &str, key_tokens: usize) -> String {
    let mut key = name.to_lowercase();
    for marker in POSSESSIVE_MARKERS {
        if key.contains(marker) {
            key = key.replace(marker, "");
        }
    }
    for pattern in BRANCH_QUALIFIERS.iter() {
        key = pattern.replace_all(&key, "").into_owned();
    }
    key.split_whitespace()
        .take(key_tokens)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display form of a brand key: each word capitalised.
#[must_use]
pub fn display_brand(key: &str) -> String {
    key.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
