//! Derives the publicly visible partial word from a secret and the guessed
//! letters. Pure functions, total over any secret and any guess set.

use crate::text;

pub const BLANK: &str = "_";

/// Renders one display token per character of the secret, preserving the
/// original casing. Non-letters (spaces, punctuation) always pass through;
/// letters are hidden behind [`BLANK`] until their folded form is guessed.
pub fn render(secret: &str, guessed: &[char]) -> Vec<String> {
    secret
        .chars()
        .map(|c| {
            let folded = text::fold_char(c);
            if !text::is_letter(folded) || guessed.contains(&folded) {
                c.to_string()
            } else {
                BLANK.to_string()
            }
        })
        .collect()
}

/// A round is won once no blanks remain. A secret without any letters is
/// solved from the start, so callers must check this after every mutation,
/// including right after the secret is set.
pub fn is_solved(secret: &str, guessed: &[char]) -> bool {
    !render(secret, guessed).iter().any(|token| token == BLANK)
}
