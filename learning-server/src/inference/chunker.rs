//! Word-bounded text chunking.

/// Greedily pack whitespace-separated words into chunks of at most
/// `max_chars` characters.
///
/// Each word costs its length plus one for the separator. A chunk is closed
/// when the next word would push it over budget; a word longer than the
/// budget gets a chunk of its own. Words are never split or dropped.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let cost = word.chars().count() + 1;
        if current_len + cost > max_chars && !current.is_empty() {
            chunks.push(current.join(" "));
            current.clear();
            current_len = 0;
        }
        current.push(word);
        current_len += cost;
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    chunks
}
