//! Text normalization for index keys

/// Lowercase and trim surrounding whitespace
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Split on runs of whitespace
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}
