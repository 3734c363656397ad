//! Text folding shared by the value parser and the normalizer.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Remove diacritics by decomposing (NFD), dropping combining marks and
/// recomposing (NFC).
pub(crate) fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}

/// Collapse every whitespace run into a single space and trim the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase, accent-free form used for lexicon lookups.
pub(crate) fn fold_token(text: &str) -> String {
    strip_diacritics(&text.trim().to_lowercase())
}

/// Check whether a value is empty after trimming.
pub(crate) fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
