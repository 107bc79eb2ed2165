// src/crawl/spider.rs
// =============================================================================
// This module runs the crawl: a fixed pool of workers sharing one Frontier.
//
// How one worker handles one task:
// 1. Take the next task from the frontier (it is now "in flight")
// 2. Tasks at max depth are skipped
// 3. Fetch the page; a failed or empty fetch abandons the task
// 4. Index the page and store the document and its words
// 5. Extract links and enqueue those one level deeper, if that level is
//    still below max depth
// 6. Mark the task complete (dropping the in-flight guard)
//
// Step 6 always comes after step 5. A worker that completes the last task
// and sees an empty queue ends the crawl, so its own children must already
// be in the queue by then.
//
// Failures stay local: a task that fails is logged and dropped, and the
// crawl carries on with everything else.
// =============================================================================

use super::fetch::Fetcher;
use super::frontier::{Enqueued, Frontier, Task};
use super::links::LinkExtractor;
use crate::index;
use crate::store::Store;
use anyhow::{anyhow, Context, Result};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use url::Url;

/// Crawl limits.
#[derive(Debug, Clone, Copy)]
pub struct CrawlLimits {
    /// Tasks at this depth or deeper are not processed. The seed has depth 0,
    /// so `max_depth = 1` indexes only the seed page.
    pub max_depth: usize,
    /// Number of concurrent workers.
    pub workers: usize,
}

/// Summary of a finished crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    /// Pages fetched, indexed and stored
    pub indexed: usize,
    /// Tasks abandoned because fetching or storing failed
    pub failed: usize,
    /// Tasks dropped because they were at max depth
    pub skipped: usize,
}

impl CrawlReport {
    fn merge(mut self, other: CrawlReport) -> Self {
        self.indexed += other.indexed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self
    }
}

// How a single task ended
enum Outcome {
    Indexed,
    Failed,
    Skipped,
}

/// The crawler: owns the collaborators shared by all workers.
#[derive(Clone)]
pub struct Spider {
    fetcher: Arc<dyn Fetcher>,
    links: Arc<dyn LinkExtractor>,
    store: Arc<dyn Store>,
    limits: CrawlLimits,
}

impl Spider {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        links: Arc<dyn LinkExtractor>,
        store: Arc<dyn Store>,
        limits: CrawlLimits,
    ) -> Self {
        Self {
            fetcher,
            links,
            store,
            limits: CrawlLimits {
                workers: limits.workers.max(1),
                ..limits
            },
        }
    }

    /// Crawls from `seed` and returns once every reachable page within the
    /// depth bound has been handled and all workers have exited.
    pub async fn run(&self, seed: &str) -> Result<CrawlReport> {
        let span = info_span!("crawl", seed, max_depth = self.limits.max_depth);
        self.run_inner(seed).instrument(span).await
    }

    async fn run_inner(&self, seed: &str) -> Result<CrawlReport> {
        let frontier = Arc::new(Frontier::new());
        match frontier.enqueue(seed, 0) {
            Enqueued::Queued => {}
            other => return Err(anyhow!("invalid seed URL {:?} ({:?})", seed, other)),
        }

        info!(workers = self.limits.workers, "spider started");

        let handles: Vec<_> = (0..self.limits.workers)
            .map(|id| {
                let spider = self.clone();
                let frontier = frontier.clone();
                tokio::spawn(
                    async move { spider.worker(&frontier).await }
                        .instrument(info_span!("worker", id)),
                )
            })
            .collect();

        let mut report = CrawlReport::default();
        for joined in join_all(handles).await {
            match joined {
                Ok(stats) => report = report.merge(stats),
                Err(e) => error!(error = %e, "crawl worker panicked"),
            }
        }

        info!(
            indexed = report.indexed,
            failed = report.failed,
            skipped = report.skipped,
            "spider finished, all tasks processed"
        );
        Ok(report)
    }

    // Pulls tasks until the frontier reports quiescence
    async fn worker(&self, frontier: &Frontier) -> CrawlReport {
        let mut stats = CrawlReport::default();

        while let Some(in_flight) = frontier.dequeue().await {
            let task = in_flight.task().clone();
            match self.process(frontier, &task).await {
                Outcome::Indexed => stats.indexed += 1,
                Outcome::Failed => stats.failed += 1,
                Outcome::Skipped => stats.skipped += 1,
            }
            // Completes the task; children were enqueued inside process()
            drop(in_flight);
        }

        debug!(
            indexed = stats.indexed,
            failed = stats.failed,
            "worker exiting"
        );
        stats
    }

    async fn process(&self, frontier: &Frontier, task: &Task) -> Outcome {
        if task.depth >= self.limits.max_depth {
            debug!(url = %task.url, depth = task.depth, "max depth reached, skipping");
            return Outcome::Skipped;
        }

        let url = match Url::parse(&task.url) {
            Ok(url) => url,
            Err(e) => {
                warn!(url = %task.url, error = %e, "unparseable task URL");
                return Outcome::Failed;
            }
        };

        debug!(url = %url, depth = task.depth, "processing URL");

        let content = match self.fetcher.fetch(&url).await {
            Ok(content) if !content.trim().is_empty() => content,
            Ok(_) => {
                warn!(url = %url, "failed to fetch content: empty body");
                return Outcome::Failed;
            }
            Err(e) => {
                warn!(url = %url, error = %e, "failed to fetch content");
                return Outcome::Failed;
            }
        };

        if let Err(e) = self.persist(&url, &content).await {
            error!(url = %url, error = %format!("{:#}", e), "error processing URL");
            return Outcome::Failed;
        }

        let next_depth = task.depth + 1;
        if next_depth < self.limits.max_depth {
            let links = self.links.extract_links(&content, &url);
            let queued = frontier.enqueue_all(&links, next_depth);
            debug!(
                url = %url,
                found = links.len(),
                queued,
                pending = frontier.pending(),
                "links enqueued"
            );
        }

        Outcome::Indexed
    }

    // Indexes the page, then stores the document and replaces its words
    async fn persist(&self, url: &Url, content: &str) -> Result<()> {
        let terms = index::index(content);
        let document = self.store.insert_document(url.as_str(), content).await?;
        self.store
            .insert_words(document, &terms)
            .await
            .with_context(|| format!("failed to store words of {}", url))?;
        debug!(url = %url, document, words = terms.len(), "document indexed");
        Ok(())
    }
}
