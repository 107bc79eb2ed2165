// src/index/normalizer.rs
// =============================================================================
// This module turns a fetched page into a term-frequency profile.
//
// Pipeline:
// 1. Drop characters that must never reach storage (U+FFFD left behind by
//    lossy decoding, control characters)
// 2. Remove <script>, <style>, <noscript> and <iframe> blocks with their body
// 3. Remove comments, then every remaining tag
// 4. Remove character entities (&nbsp; &#169; ...)
// 5. Remove presentation noise: sized numbers (12px, 1.5em, 40%) and colour
//    functions (rgb(...), hsla(...))
// 6. Replace punctuation with spaces, lowercase, split on whitespace
// 7. Keep words of 3..=32 characters and count them
//
// The output is sorted by frequency (highest first); equal frequencies are
// ordered alphabetically so the same page always produces the same list.
//
// Everything here is a pure function over its input. The compiled regexes
// are immutable statics shared by all workers.
// =============================================================================

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

/// Shortest word that is indexed, in characters.
pub const MIN_WORD_LEN: usize = 3;
/// Longest word that is indexed, in characters.
pub const MAX_WORD_LEN: usize = 32;

// The regex crate has no backreferences, so each block tag gets its own pattern.
// An unclosed block (truncated page) runs to the end of the content.
static BLOCK_TAGS: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["script", "style", "noscript", "iframe"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?(?:</{tag}\s*>|\z)"))
                .expect("block tag pattern is valid")
        })
        .collect()
});

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&[a-zA-Z0-9#]+;").expect("entity pattern is valid"));

static SIZED_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b\d+(?:\.\d+)?(?:(?:px|em|rem|pt|vh|vw)\b|%)")
        .expect("sized number pattern is valid")
});

static COLOR_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:rgba?|hsla?)\([^)]*\)").expect("colour function pattern is valid")
});

// Anything that is not a word character, whitespace or a hyphen
static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("punctuation pattern is valid"));

/// One distinct word of a document and how often it occurs there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermCount {
    pub word: String,
    pub frequency: u32,
}

impl TermCount {
    pub fn new(word: impl Into<String>, frequency: u32) -> Self {
        Self {
            word: word.into(),
            frequency,
        }
    }
}

/// Indexes raw page content into term frequencies.
///
/// Returns one entry per distinct word, sorted by descending frequency and
/// then by word.
///
/// Example:
///   index("<p>Test test TEST</p>") == [TermCount { word: "test", frequency: 3 }]
pub fn index(content: &str) -> Vec<TermCount> {
    let text = extract_text(content);

    let mut counts: HashMap<&str, u32> = HashMap::new();
    for word in text.split_whitespace().filter(|w| is_indexable(w)) {
        *counts.entry(word).or_insert(0) += 1;
    }

    let mut terms: Vec<TermCount> = counts
        .into_iter()
        .map(|(word, frequency)| TermCount::new(word, frequency))
        .collect();

    terms.sort_by(|a, b| {
        b.frequency
            .cmp(&a.frequency)
            .then_with(|| a.word.cmp(&b.word))
    });
    terms
}

/// Strips markup and noise from `content` and returns lowercase text with
/// single spaces between tokens.
pub fn extract_text(content: &str) -> String {
    let mut text: String = content.chars().filter(|&c| is_storable(c)).collect();

    for block in BLOCK_TAGS.iter() {
        text = block.replace_all(&text, " ").into_owned();
    }

    let steps: [&Regex; 6] = [
        &*COMMENT,
        &*TAG,
        &*ENTITY,
        &*SIZED_NUMBER,
        &*COLOR_FUNCTION,
        &*PUNCTUATION,
    ];
    for pattern in steps {
        text = pattern.replace_all(&text, " ").into_owned();
    }

    // Unicode-aware and locale independent
    let lowered = text.to_lowercase();

    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drops U+FFFD replacement characters and replaces control characters
/// (other than newline and tab) with spaces.
///
/// This is the form in which raw page content is stored as a document.
pub fn sanitize_content(content: &str) -> String {
    content
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER)
        .map(|c| {
            if c.is_control() && c != '\n' && c != '\t' {
                ' '
            } else {
                c
            }
        })
        .collect()
}

fn is_storable(c: char) -> bool {
    c != char::REPLACEMENT_CHARACTER && (!c.is_control() || c.is_whitespace())
}

fn is_indexable(word: &str) -> bool {
    let len = word.chars().count();
    (MIN_WORD_LEN..=MAX_WORD_LEN).contains(&len)
        && word.chars().any(|c| c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frequency_of(terms: &[TermCount], word: &str) -> Option<u32> {
        terms.iter().find(|t| t.word == word).map(|t| t.frequency)
    }

    #[test]
    fn test_counts_repeated_word() {
        let terms = index("test test test");
        assert_eq!(terms, vec![TermCount::new("test", 3)]);
    }

    #[test]
    fn test_length_bounds() {
        let long = "a".repeat(33);
        let exact = "b".repeat(32);
        let content = format!("ab abc {} {}", long, exact);
        let terms = index(&content);

        assert_eq!(frequency_of(&terms, "ab"), None);
        assert_eq!(frequency_of(&terms, "abc"), Some(1));
        assert_eq!(frequency_of(&terms, &long), None);
        assert_eq!(frequency_of(&terms, &exact), Some(1));
    }

    #[test]
    fn test_length_is_measured_in_characters() {
        // Three Cyrillic letters are six bytes but only three characters
        let terms = index("дом");
        assert_eq!(frequency_of(&terms, "дом"), Some(1));
    }

    #[test]
    fn test_strips_tags_and_blocks() {
        let html = r#"
            <html><head>
              <style>body { color: red; }</style>
              <SCRIPT type="text/javascript">var hidden = "secret";</SCRIPT>
            </head>
            <body><!-- invisible comment -->
              <h1 class="title">Visible heading</h1>
              <noscript>enable javascript</noscript>
              <iframe src="x">framed</iframe>
            </body></html>
        "#;
        let text = extract_text(html);

        assert_eq!(text, "visible heading");
    }

    #[test]
    fn test_unclosed_block_runs_to_end() {
        let terms = index("<p>hello world</p><script>var secretvariable = 1; function trackuser() {}");
        let words: Vec<&str> = terms.iter().map(|t| t.word.as_str()).collect();
        assert_eq!(words, vec!["hello", "world"]);

        let text = extract_text("<style>p { color: red }</style><p>kept</p><STYLE media=print>.hidden {");
        assert_eq!(text, "kept");
    }

    #[test]
    fn test_removes_entities_and_style_noise() {
        let text = extract_text("width 100px margin 1.5em 40% hsla(120, 50%, 50%, 0.3) rgb(1,2,3) fish&nbsp;chips &#169;");
        assert_eq!(text, "width margin fish chips");
    }

    #[test]
    fn test_unicode_case_folding() {
        let terms = index("Straße STRASSE Ζεύς ΖΕΎΣ Привет ПРИВЕТ привет");
        assert_eq!(frequency_of(&terms, "привет"), Some(3));
        assert_eq!(frequency_of(&terms, "ζεύς"), Some(2));
        assert_eq!(frequency_of(&terms, "straße"), Some(1));
        assert_eq!(frequency_of(&terms, "strasse"), Some(1));
    }

    #[test]
    fn test_punctuation_is_discarded() {
        let terms = index("hello, world! (hello) ... --- well-known");
        assert_eq!(frequency_of(&terms, "hello"), Some(2));
        assert_eq!(frequency_of(&terms, "world"), Some(1));
        assert_eq!(frequency_of(&terms, "well-known"), Some(1));
        assert_eq!(frequency_of(&terms, "---"), None);
    }

    #[test]
    fn test_ties_are_alphabetical() {
        let terms = index("zebra apple mango apple zebra mango kiwi");
        let words: Vec<&str> = terms.iter().map(|t| t.word.as_str()).collect();
        assert_eq!(words, vec!["apple", "mango", "zebra", "kiwi"]);
    }

    #[test]
    fn test_invalid_characters_are_dropped() {
        let decoded = String::from_utf8_lossy(b"caf\xff\xfe words\x07here");
        let text = extract_text(&decoded);
        assert!(!text.contains(char::REPLACEMENT_CHARACTER));
        assert_eq!(text, "caf wordshere");
    }

    #[test]
    fn test_empty_content() {
        assert!(index("").is_empty());
        assert!(index("<html><body></body></html>").is_empty());
    }

    #[test]
    fn test_sanitize_content_keeps_layout_whitespace() {
        assert_eq!(sanitize_content("a\u{0}b\nc\td\r"), "a b\nc\td ");
    }

    #[test]
    fn test_sanitize_content_drops_replacement_characters() {
        let decoded = String::from_utf8_lossy(b"<p>caf\xe9 ok</p>");
        assert_eq!(sanitize_content(&decoded), "<p>caf ok</p>");
    }
}
