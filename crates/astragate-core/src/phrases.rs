/// Accepted spoken confirmations. The first one is the phrase users are
/// prompted with.
pub const DEFAULT_PHRASES: &[&str] = &["yes, execute", "yes execute", "confirm", "proceed", "yes"];

/// Normalize captured speech: case-folded and trimmed.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// True when `text` equals or contains any accepted phrase.
pub fn matches_any<S: AsRef<str>>(text: &str, phrases: &[S]) -> bool {
    let heard = normalize(text);
    if heard.is_empty() {
        return false;
    }
    phrases.iter().any(|p| {
        let phrase = normalize(p.as_ref());
        !phrase.is_empty() && (heard == phrase || heard.contains(&phrase))
    })
}
