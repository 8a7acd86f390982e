/// Lowercases and trims a raw query.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Splits a query into lowercase, space-separated search terms.
///
/// Punctuation is kept: terms are matched as literal substrings.
pub fn tokenize_query(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
