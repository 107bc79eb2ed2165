// src/store/memory.rs
// =============================================================================
// An in-memory Store.
//
// Two tables, like the SQL schema:
// - documents: id -> (url, content), plus a url -> id lookup for upserts
// - words: document id -> its term counts
//
// Everything sits behind one RwLock so an upsert (lookup + insert) is atomic.
// The lock is never held across an .await.
// =============================================================================

use super::{DocumentId, Posting, Store};
use crate::index::{sanitize_content, TermCount};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// A stored document row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    pub url: String,
    pub content: String,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: DocumentId,
    documents: HashMap<DocumentId, Document>,
    ids_by_url: HashMap<String, DocumentId>,
    words: HashMap<DocumentId, Vec<TermCount>>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub fn document_count(&self) -> usize {
        self.read().documents.len()
    }

    /// Looks a document up by URL.
    pub fn document(&self, url: &str) -> Option<Document> {
        let tables = self.read();
        let id = tables.ids_by_url.get(url)?;
        tables.documents.get(id).cloned()
    }

    /// URLs of every stored document, sorted.
    pub fn urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.read().ids_by_url.keys().cloned().collect();
        urls.sort();
        urls
    }

    /// The term rows currently stored for a document.
    pub fn terms(&self, document: DocumentId) -> Vec<TermCount> {
        self.read().words.get(&document).cloned().unwrap_or_default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_document(&self, url: &str, content: &str) -> Result<DocumentId> {
        let content = sanitize_content(content);
        let mut tables = self.write();

        let existing = tables.ids_by_url.get(url).copied();
        if let Some(id) = existing {
            if let Some(document) = tables.documents.get_mut(&id) {
                document.content = content;
            }
            return Ok(id);
        }

        tables.next_id += 1;
        let id = tables.next_id;
        tables.ids_by_url.insert(url.to_string(), id);
        tables.documents.insert(
            id,
            Document {
                id,
                url: url.to_string(),
                content,
            },
        );
        Ok(id)
    }

    async fn insert_words(&self, document: DocumentId, terms: &[TermCount]) -> Result<()> {
        let mut tables = self.write();
        if !tables.documents.contains_key(&document) {
            bail!("document {} does not exist", document);
        }
        tables.words.insert(document, terms.to_vec());
        Ok(())
    }

    async fn postings(&self, word: &str) -> Result<Vec<Posting>> {
        let tables = self.read();
        let postings = tables
            .words
            .iter()
            .filter_map(|(id, terms)| {
                let term = terms.iter().find(|t| t.word == word)?;
                let document = tables.documents.get(id)?;
                Some(Posting {
                    url: document.url.clone(),
                    frequency: term.frequency,
                })
            })
            .collect();
        Ok(postings)
    }
}
