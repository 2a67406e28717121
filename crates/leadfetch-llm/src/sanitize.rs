//! Deterministic cleanup of model completions into plain search keywords.
//!
//! The prompt asks for bare keywords, but completions still arrive wrapped in
//! code fences, quoted, hashtagged, or with boolean operators. Rather than
//! re-prompting, the output is reduced heuristically so a decorated
//! completion degrades to a usable query instead of an error.

/// Reduces a raw completion to a single line of plain keywords.
///
/// Steps: drop code-fence lines, keep the first non-empty line, strip
/// everything but letters, digits, and whitespace, then drop uppercase
/// boolean operators (`AND`, `OR`, `NOT`) and collapse whitespace.
///
/// Returns an empty string when nothing survives; callers treat that as a
/// failed generation.
#[must_use]
pub fn sanitize_query(completion: &str) -> String {
    let line = completion
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with("```"))
        .unwrap_or("");

    let stripped: String = line
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    stripped
        .split_whitespace()
        .filter(|token| !matches!(*token, "AND" | "OR" | "NOT"))
        .collect::<Vec<_>>()
        .join(" ")
}
