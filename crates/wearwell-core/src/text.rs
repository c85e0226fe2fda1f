//! Text normalization shared by the catalog store and the prediction pipeline.
//!
//! Two distinct tokenization rules coexist on purpose: the catalog/search path
//! keeps internal hyphens and apostrophes ("well-made", "don't" stay single
//! tokens), the prediction path splits on everything non-alphanumeric ("don't"
//! becomes "don", "t"). Callers must use the rule matching their path.

use std::sync::OnceLock;

use regex::Regex;

const DEFAULT_SLUG: &str = "item";

fn search_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[a-z]+(?:['-][a-z]+)?").expect("valid regex"))
}

fn predict_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[a-z0-9]+").expect("valid regex"))
}

fn slug_separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"))
}

/// Tokenize for the catalog/search path.
///
/// Lowercases, then extracts maximal letter runs optionally containing one
/// internal hyphen or apostrophe. Empty input yields an empty vec.
#[must_use]
pub fn search_tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    search_token_re()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Tokenize for the prediction path.
///
/// Lowercases, then extracts maximal alphanumeric runs; punctuation acts as
/// whitespace. Empty input yields an empty vec.
#[must_use]
pub fn predict_tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    predict_token_re()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Derive a stable URL-safe slug from a product title.
///
/// Lowercases, collapses non-alphanumeric runs to single hyphens, strips
/// leading/trailing hyphens. Titles with no usable characters slug to `"item"`.
/// Idempotent: `slugify(slugify(x)) == slugify(x)`.
#[must_use]
pub fn slugify(value: &str) -> String {
    let lowered = value.to_lowercase();
    let slug = slug_separator_re().replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        slug.to_string()
    }
}
