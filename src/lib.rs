// src/lib.rs
// =============================================================================
// spider-search: a small web search engine.
//
// Pipeline:
//   seed URL -> crawl (fetch, index, store, follow links) -> ranked queries
//
// Modules:
// - config: Config.ini loading and typed settings
// - crawl: the concurrent crawler (frontier, workers, fetching, links)
// - index: turning HTML into word counts
// - store: where documents and word counts are persisted
// - search: ranking, the console prompt and the HTTP server
// =============================================================================

pub mod config;
pub mod crawl;
pub mod index;
pub mod search;
pub mod store;

use anyhow::Result;
use config::Settings;
use std::sync::Arc;
use store::{MemoryStore, PostgresStore, Store};
use tracing::info;

/// Opens the store selected by the settings: PostgreSQL when a `[database]`
/// section is configured, otherwise an in-memory store.
pub async fn open_store(settings: &Settings) -> Result<Arc<dyn Store>> {
    match &settings.database {
        Some(database) => Ok(Arc::new(PostgresStore::connect(database).await?)),
        None => {
            info!("no [database] section configured, using the in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Builds a crawler wired to the real HTTP fetcher and HTML link extractor.
pub fn build_spider(settings: &Settings, store: Arc<dyn Store>) -> Result<crawl::Spider> {
    let fetcher = crawl::HttpFetcher::new(&settings.spider.user_agent, settings.spider.fetch_timeout)?;
    Ok(crawl::Spider::new(
        Arc::new(fetcher),
        Arc::new(crawl::HtmlLinkExtractor),
        store,
        crawl::CrawlLimits {
            max_depth: settings.spider.max_depth,
            workers: settings.spider.workers,
        },
    ))
}
