//! Small text helpers shared by the gate and the fluency heuristic.

/// Closed-class function words (prepositions, conjunctions, particles).
/// A sentence ending in one of these is almost certainly a truncated rewrite.
pub const FUNCTION_WORDS: &[&str] = &[
    "на", "в", "с", "к", "по", "о", "за", "от", "у", "и", "а", "но", "да", "ли", "э",
];

/// Collapse internal whitespace runs and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// The last token of `text` with trailing punctuation stripped, lowercased.
pub fn last_word(text: &str) -> Option<String> {
    let word = text.split_whitespace().last()?;
    let stripped = word.trim_end_matches(['.', ',', '!', '?', ';', ':', '…']);
    if stripped.is_empty() {
        return None;
    }
    Some(stripped.to_lowercase())
}

/// Whether the text ends in a bare closed-class function word.
pub fn ends_with_function_word(text: &str) -> bool {
    match last_word(text) {
        Some(w) => FUNCTION_WORDS.contains(&w.as_str()),
        None => false,
    }
}

/// Mismatched parenthesis count.
pub fn unbalanced_parens(text: &str) -> bool {
    text.matches('(').count() != text.matches(')').count()
}

/// Odd number of straight double quotes.
pub fn odd_quote_count(text: &str) -> bool {
    text.matches('"').count() % 2 != 0
}
