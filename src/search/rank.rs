// src/search/rank.rs
// =============================================================================
// This module ranks documents for a query.
//
// Scoring: a document's score is the SUM of the frequencies of every query
// word it contains. A page with "ocean" x1 and "blue" x2 scores 3 for the
// query "ocean blue", exactly like a page with "ocean" x3.
//
// Ordering: highest score first; equal scores are ordered by URL so the same
// index always gives the same result list.
// =============================================================================

use crate::store::Store;
use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedResult {
    pub url: String,
    pub score: u64,
}

/// Answers queries from a Store. Cheap to clone.
#[derive(Clone)]
pub struct Ranker {
    store: Arc<dyn Store>,
}

impl Ranker {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Ranks every document that contains at least one of `words`.
    ///
    /// `words` should already be normalized (see `tokenize_query`). An empty
    /// query or a query nothing matches gives an empty list.
    pub async fn ranked_documents(&self, words: &[String]) -> Result<Vec<RankedResult>> {
        let mut scores: HashMap<String, u64> = HashMap::new();

        for (i, word) in words.iter().enumerate() {
            // Repeated words are only counted once
            if words[..i].contains(word) {
                continue;
            }
            for posting in self.store.postings(word).await? {
                *scores.entry(posting.url).or_insert(0) += u64::from(posting.frequency);
            }
        }

        let results = sort_results(scores);
        debug!(words = words.len(), results = results.len(), "query ranked");
        Ok(results)
    }
}

fn sort_results(scores: HashMap<String, u64>) -> Vec<RankedResult> {
    let mut results: Vec<RankedResult> = scores
        .into_iter()
        .map(|(url, score)| RankedResult { url, score })
        .collect();
    results.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.url.cmp(&b.url)));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::TermCount;
    use crate::store::MemoryStore;

    async fn store_with(pages: &[(&str, &[(&str, u32)])]) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for (url, terms) in pages {
            let id = store.insert_document(url, "").await.unwrap();
            let terms: Vec<TermCount> = terms.iter().map(|(w, f)| TermCount::new(*w, *f)).collect();
            store.insert_words(id, &terms).await.unwrap();
        }
        store
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    fn result(url: &str, score: u64) -> RankedResult {
        RankedResult { url: url.to_string(), score }
    }

    #[tokio::test]
    async fn test_scores_are_summed_and_ties_ordered_by_url() {
        let store = store_with(&[
            ("https://a.test/", &[("ocean", 3)]),
            ("https://b.test/", &[("ocean", 1), ("blue", 2)]),
        ])
        .await;
        let ranker = Ranker::new(store);

        let results = ranker.ranked_documents(&words(&["ocean", "blue"])).await.unwrap();

        // 3 vs 1 + 2: a tie, broken by URL
        assert_eq!(results, vec![result("https://a.test/", 3), result("https://b.test/", 3)]);
    }

    #[tokio::test]
    async fn test_higher_sum_ranks_first() {
        let store = store_with(&[
            ("https://a.test/", &[("ocean", 3)]),
            ("https://b.test/", &[("ocean", 2), ("blue", 2)]),
            ("https://c.test/", &[("blue", 1)]),
        ])
        .await;
        let ranker = Ranker::new(store);

        let results = ranker.ranked_documents(&words(&["ocean", "blue"])).await.unwrap();

        assert_eq!(
            results,
            vec![
                result("https://b.test/", 4),
                result("https://a.test/", 3),
                result("https://c.test/", 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_query_and_no_matches() {
        let store = store_with(&[("https://a.test/", &[("ocean", 3)])]).await;
        let ranker = Ranker::new(store);

        assert!(ranker.ranked_documents(&[]).await.unwrap().is_empty());
        assert!(ranker.ranked_documents(&words(&["desert"])).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_query_word_counts_once() {
        let store = store_with(&[("https://a.test/", &[("ocean", 3)])]).await;
        let ranker = Ranker::new(store);

        let results = ranker.ranked_documents(&words(&["ocean", "ocean"])).await.unwrap();
        assert_eq!(results, vec![result("https://a.test/", 3)]);
    }
}
