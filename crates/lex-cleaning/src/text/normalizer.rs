//! Per-value text normalization.

use once_cell::sync::Lazy;
use regex::Regex;

use super::stopwords::remove_stop_words;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("Invalid regex: tag"));
static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("Invalid regex: non-word"));
static DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("Invalid regex: digits"));
static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid regex: whitespace"));
static EMOJI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{Extended_Pictographic}\p{Emoji_Modifier}\x{200D}\x{20E3}\x{FE0E}\x{FE0F}]")
        .expect("Invalid regex: emoji")
});

/// Case, tag, punctuation, digit and whitespace normalization.
///
/// Applying this twice yields the same string as applying it once.
pub fn normalize_surface(text: &str) -> String {
    let lowered = text.to_lowercase();
    let untagged = TAG_RE.replace_all(&lowered, "");
    let words_only = NON_WORD_RE.replace_all(&untagged, "");
    let no_digits = DIGIT_RE.replace_all(&words_only, "");
    WHITESPACE_RE
        .replace_all(&no_digits, " ")
        .trim()
        .to_string()
}

/// Remove emoji and pictographic code points, including joiners and
/// presentation selectors.
pub fn strip_emoji(text: &str) -> String {
    EMOJI_RE.replace_all(text, "").into_owned()
}

/// Full normalization: surface cleanup, emoji removal, stop-word removal.
pub fn normalize_text(text: &str) -> String {
    let surface = normalize_surface(text);
    let no_emoji = strip_emoji(&surface);
    remove_stop_words(&no_emoji)
}
