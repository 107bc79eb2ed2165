// src/main.rs
// =============================================================================
// This is the entry point of the spider-search binary.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing) and load Config.ini
// 3. Dispatch to the subcommand handler
// 4. Exit with proper code (0 = success, 1 = search found nothing, 2 = error)
// =============================================================================

mod cli;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use spider_search::config::Settings;
use spider_search::crawl::CrawlReport;
use spider_search::search::{self, RankedResult, Ranker};
use spider_search::{build_spider, open_store};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    // A missing or incomplete config file stops us here
    let settings = Settings::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    info!(config = %cli.config.display(), "configuration loaded");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => handle_run(settings).await,
        Commands::Crawl { seed, max_depth } => handle_crawl(settings, seed, max_depth).await,
        Commands::Search { words, json } => handle_search(settings, &words.join(" "), json).await,
        Commands::Serve => handle_serve(settings).await,
    }
}

// Handles the default 'run' command: the HTTP server starts right away, the
// crawl runs to completion, then the console prompt takes over. Leaving the
// prompt stops the server.
async fn handle_run(settings: Settings) -> Result<i32> {
    let store = open_store(&settings).await?;
    let ranker = Ranker::new(store.clone());

    let listener = bind(&settings).await?;
    let app = search::router(ranker.clone(), settings.server.request_timeout);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(search::serve(listener, app, async move {
        let _ = stop_rx.await;
    }));

    println!("🔍 Crawling: {}", settings.spider.start_url);
    println!("📊 Max crawl depth: {}", settings.spider.max_depth);
    let spider = build_spider(&settings, store)?;
    let report = spider.run(&settings.spider.start_url).await?;
    print_report(&report);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    search::run_console(&ranker, stdin, &mut stdout).await?;

    let _ = stop_tx.send(());
    server
        .await
        .map_err(|e| anyhow!("HTTP server task failed: {}", e))??;

    info!("application finished");
    Ok(0)
}

// Handles the 'crawl' command
async fn handle_crawl(
    mut settings: Settings,
    seed: Option<String>,
    max_depth: Option<usize>,
) -> Result<i32> {
    if let Some(seed) = seed {
        settings.spider.start_url = seed;
    }
    if let Some(max_depth) = max_depth {
        settings.spider.max_depth = max_depth;
    }

    println!("🔍 Crawling: {}", settings.spider.start_url);
    println!("📊 Max crawl depth: {}", settings.spider.max_depth);

    let store = open_store(&settings).await?;
    let spider = build_spider(&settings, store)?;
    let report = spider.run(&settings.spider.start_url).await?;
    print_report(&report);
    Ok(0)
}

// Handles the 'search' command
async fn handle_search(settings: Settings, query: &str, json: bool) -> Result<i32> {
    if settings.database.is_none() {
        eprintln!("⚠️  No [database] configured: the in-memory index starts empty");
    }
    let store = open_store(&settings).await?;
    let ranker = Ranker::new(store);

    let words = search::tokenize_query(query);
    let results = ranker.ranked_documents(&words).await?;
    print_results(&results, json)?;

    if results.is_empty() {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Handles the 'serve' command
async fn handle_serve(settings: Settings) -> Result<i32> {
    let store = open_store(&settings).await?;
    let app = search::router(Ranker::new(store), settings.server.request_timeout);
    let listener = bind(&settings).await?;

    search::serve(listener, app, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;
    Ok(0)
}

async fn bind(settings: &Settings) -> Result<TcpListener> {
    let port = settings.server.port;
    TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind HTTP server to port {}", port))
}

// Prints the results either as a table or JSON
fn print_results(results: &[RankedResult], json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(results)?;
        println!("{}", json_output);
    } else {
        print!("{}", search::format_table(results));
    }
    Ok(())
}

fn print_report(report: &CrawlReport) {
    println!();
    println!("📊 Summary:");
    println!("   ✅ Indexed: {}", report.indexed);
    println!("   ❌ Failed: {}", report.failed);
    println!("   ⏭️  Beyond max depth: {}", report.skipped);
    println!();
}
