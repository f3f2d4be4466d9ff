//! Identifier sanitization.
//!
//! SBML identifiers must match `[A-Za-z_][A-Za-z0-9_]*`. Model element names are
//! free text, so every name passes through [`sanitize_id`] before it becomes an
//! identifier. Display names and notes get lighter treatment.

use lazy_static::lazy_static;
use regex::Regex;

use crate::model::Element;

lazy_static! {
    static ref ILLEGAL_ID_CHAR: Regex = Regex::new(r"[^A-Za-z0-9_]").unwrap();
}

/// Turns arbitrary text into a legal SBML identifier.
///
/// Known special characters are spelled out (`-` becomes `_minus_`, `(`
/// becomes `_bo_` and so on), anything else that is not alphanumeric becomes
/// `_`, and a leading digit is prefixed with `_`.
///
/// # Arguments
/// * `name` - Free text to convert
///
/// # Returns
/// A string that is always a valid SId
pub fn sanitize_id(name: &str) -> String {
    let mut spelled = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '&' => spelled.push_str("_and"),
            '<' => spelled.push_str("_lessthan_"),
            '>' => spelled.push_str("_greaterthan_"),
            '-' => spelled.push_str("_minus_"),
            '\'' => spelled.push_str("_prime_"),
            '+' => spelled.push_str("_plus_"),
            '*' => spelled.push_str("_star_"),
            '/' => spelled.push_str("_slash_"),
            '(' => spelled.push_str("_bo_"),
            ')' => spelled.push_str("_bc_"),
            '[' => spelled.push_str("_sbo_"),
            ']' => spelled.push_str("_sbc_"),
            '.' => spelled.push_str("_dot_"),
            ' ' => spelled.push('_'),
            other => spelled.push(other),
        }
    }

    let legal = ILLEGAL_ID_CHAR.replace_all(&spelled, "_");
    prefix_leading_digit(&legal)
}

/// Cleans a name for the `name` attribute of species and reactions.
pub fn sanitize_display_name(name: &str) -> String {
    let cleaned = name
        .replace('\'', "_prime_")
        .replace('\\', "_slash_")
        .replace('/', "_slash_")
        .replace('[', "_sbo_")
        .replace(']', "_sbc_")
        .replace(": ", "_")
        .replace(' ', "_");

    prefix_leading_digit(&cleaned)
}

/// Escapes markup characters in free-text notes and trims surrounding whitespace.
pub fn sanitize_notes(text: &str) -> String {
    text.replace('&', "_and")
        .replace('<', "_lessthan_")
        .replace('>', "_greaterthan_")
        .trim()
        .to_string()
}

/// Document-wide identifier of an element: `name_id_index_`, sanitized.
pub fn entity_id(element: &Element) -> String {
    sanitize_id(&format!(
        "{}_{}_{}_",
        element.name, element.id, element.data_index
    ))
}

/// Prefixes `_` to text that starts with a digit.
pub fn prefix_leading_digit(text: &str) -> String {
    match text.chars().next() {
        Some(first) if first.is_ascii_digit() => format!("_{text}"),
        _ => text.to_string(),
    }
}

/// Checks the SBML SId syntax.
pub fn is_valid_sid(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
