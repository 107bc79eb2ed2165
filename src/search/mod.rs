// src/search/mod.rs
// =============================================================================
// This module answers search queries.
//
// Submodules:
// - query: turns typed text into index words
// - rank: sums term frequencies per document and orders the results
// - console: the interactive prompt
// - server: the HTTP surface (axum)
//
// Both the console and the HTTP server go through `Ranker::ranked_documents`.
// =============================================================================

mod console;
mod query;
mod rank;
mod server;

pub use console::{format_table, run_console, EXIT_COMMAND};
pub use query::tokenize_query;
pub use rank::{RankedResult, Ranker};
pub use server::{router, serve};
