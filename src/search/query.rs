// src/search/query.rs
// Turns what a user typed into the words the index was built from.

/// Splits a raw query into index words.
///
/// Each whitespace-separated token loses its punctuation (hyphens are kept,
/// as in the index) and is lowercased. Empty tokens and repeats are dropped;
/// the first occurrence keeps its position.
///
/// Example:
///   tokenize_query("Ocean, BLUE ocean!") == ["ocean", "blue"]
pub fn tokenize_query(query: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for token in query.split_whitespace() {
        let word: String = token
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
            .collect::<String>()
            .to_lowercase();
        if !word.is_empty() && !words.contains(&word) {
            words.push(word);
        }
    }
    words
}
