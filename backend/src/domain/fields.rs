//! Normalisation and validation for recipe form fields.
//!
//! Every text field arriving from a form passes through exactly one of these
//! functions before it reaches the recipe store. They trim first, so a field
//! of pure whitespace counts as empty.

use crate::domain::DomainError;

/// Normalise a recipe title: collapse whitespace and capitalise each word.
///
/// Each whitespace-separated word has its first character upcased and the
/// remainder downcased, so `"MIXED case TITLE"` becomes `"Mixed Case Title"`.
///
/// # Errors
/// Returns a [`DomainError::empty_field`] error when nothing remains after
/// trimming.
///
/// # Examples
/// ```
/// use backend::domain::fields::normalize_title;
///
/// let title = normalize_title("  spiced  lentil soup ").expect("non-empty");
/// assert_eq!(title, "Spiced Lentil Soup");
/// ```
pub fn normalize_title(raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::empty_field());
    }
    let words: Vec<String> = trimmed.split_whitespace().map(capitalize_word).collect();
    Ok(words.join(" "))
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Split a multi-line field into its non-blank lines.
///
/// Accepts both `\r\n` and `\n` line endings. Lines are trimmed and blank
/// lines are discarded, so pasted text with stray carriage returns or double
/// spacing still yields a clean list.
///
/// # Errors
/// Returns a [`DomainError::empty_field`] error when no non-blank line
/// remains.
pub fn split_lines(raw: &str) -> Result<Vec<String>, DomainError> {
    let lines: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect();
    if lines.is_empty() {
        return Err(DomainError::empty_field());
    }
    Ok(lines)
}

/// Validate a single-line field, returning its trimmed content.
///
/// # Errors
/// Returns a [`DomainError::empty_field`] error when nothing remains after
/// trimming.
pub fn non_empty(raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::empty_field());
    }
    Ok(trimmed.to_owned())
}
