// src/store/mod.rs
// =============================================================================
// This module is the persistence gateway: where documents and their term
// counts live, and where the ranker looks words up.
//
// Implementations:
// - memory: a process-local store (tests, runs without a database)
// - postgres: PostgreSQL via tokio-postgres
//
// Contract shared by every implementation:
// - insert_document is an upsert keyed by URL. The same URL always maps to
//   the same id; its content is replaced
// - insert_words replaces ALL term rows of a document, never merges
// - Every method may be called concurrently from many crawl workers
// =============================================================================

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::index::TermCount;
use anyhow::Result;
use async_trait::async_trait;

/// Identifier the store assigns to a document.
pub type DocumentId = i64;

/// One occurrence record of a word: the document it appears in and how often.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub url: String,
    pub frequency: u32,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts a document, or replaces the content of the one with this URL.
    async fn insert_document(&self, url: &str, content: &str) -> Result<DocumentId>;

    /// Replaces every term row of `document` with `terms`.
    async fn insert_words(&self, document: DocumentId, terms: &[TermCount]) -> Result<()>;

    /// All documents containing `word`, with the word's frequency in each.
    async fn postings(&self, word: &str) -> Result<Vec<Posting>>;
}
