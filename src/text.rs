//! Turkish-locale text folding for secret and guess comparison.
//!
//! A generic Unicode lowercase maps `I` to `i`, which is wrong for Turkish:
//! dotless `I` folds to `ı` and dotted `İ` folds to `i`. Everything compared
//! in this crate (secrets, guessed letters) goes through these functions;
//! display strings keep their original casing.

/// Lowercases a single character with the Turkish dotted/dotless tailoring.
pub fn fold_char(c: char) -> char {
    match c {
        'I' => 'ı',
        'İ' => 'i',
        _ => c.to_lowercase().next().unwrap_or(c),
    }
}

/// Trims, folds and collapses internal whitespace runs to single spaces.
/// Used only for equality and containment checks, never for display.
pub fn normalize(text: &str) -> String {
    let folded: String = text.chars().map(fold_char).collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a folded character belongs to the guessable alphabet.
/// Matches the `a-z` range plus the Turkish-specific letters, like the
/// original game's letter set.
pub fn is_letter(c: char) -> bool {
    matches!(c, 'a'..='z' | 'ç' | 'ğ' | 'ı' | 'ö' | 'ş' | 'ü')
}
