// Small text helpers shared by the content-oriented analyzers.

/// Words are whitespace-separated runs containing at least one alphanumeric.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count()
}

/// Sentences split on terminal punctuation, empty fragments dropped.
pub fn sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| word_count(s) > 0)
        .collect()
}

/// Shorten `text` to `max` characters for issue details.
pub fn clip(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}
