// src/index/mod.rs
// =============================================================================
// This module contains the indexing stage of the pipeline.
//
// Submodules:
// - normalizer: strips markup from fetched pages and counts words
//
// The output (a list of TermCount) is what gets persisted per document and
// what the ranker later sums over.
// =============================================================================

mod normalizer;

pub use normalizer::{extract_text, index, sanitize_content, TermCount, MAX_WORD_LEN, MIN_WORD_LEN};
