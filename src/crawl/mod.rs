// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Concurrent crawling with a fixed pool of workers
// - Each URL is fetched at most once per crawl
// - Configurable depth limit (seed = depth 0)
// - Clean termination once no task is queued or in flight
//
// Submodules:
// - frontier: the shared task queue, visited set and in-flight counter
// - spider: the worker pool that drives a crawl
// - fetch: downloading pages (reqwest)
// - links: pulling links out of HTML (scraper)
// =============================================================================

mod fetch;
mod frontier;
mod links;
mod spider;

pub use fetch::{Fetcher, HttpFetcher};
pub use frontier::{canonicalize, Enqueued, Frontier, InFlight, Task};
pub use links::{extract_html_links, HtmlLinkExtractor, LinkExtractor};
pub use spider::{CrawlLimits, CrawlReport, Spider};
