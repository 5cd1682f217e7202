//! Code token normalization and bulk text parsing.

/// Normalize a submitted code: trim surrounding whitespace and upper-case.
///
/// Returns `None` for blank input.
///
/// ```
/// use ekpool_domain::code::normalize_code;
///
/// assert_eq!(normalize_code("  ab-12 "), Some("AB-12".to_owned()));
/// assert_eq!(normalize_code(" \t"), None);
/// ```
pub fn normalize_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Split bulk text input into code tokens.
///
/// Tokens are separated by any run of whitespace or commas. Empty tokens are
/// dropped; repeated tokens are kept so each occurrence can be attempted
/// (and reported) on its own.
///
/// ```
/// use ekpool_domain::code::parse_code_list;
///
/// assert_eq!(parse_code_list("A1, A1\nB2,,"), vec!["A1", "A1", "B2"]);
/// ```
pub fn parse_code_list(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}
