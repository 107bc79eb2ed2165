// src/search/console.rs
// =============================================================================
// The interactive search prompt.
//
// Loop:
// 1. Print the prompt
// 2. Read one line; "/exit_search" or end of input stops the loop
// 3. Tokenize, rank, print a URL / relevance table (or "No results found.")
//
// Input and output are passed in, so the loop runs the same against stdin/
// stdout and against in-memory buffers in tests.
// =============================================================================

use super::query::tokenize_query;
use super::rank::{RankedResult, Ranker};
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::error;

/// The line that ends the interactive loop.
pub const EXIT_COMMAND: &str = "/exit_search";

const URL_WIDTH: usize = 60;

/// Runs the prompt until the exit command or end of input.
///
/// Returns the number of queries answered.
pub async fn run_console<R, W>(ranker: &Ranker, input: R, out: &mut W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut answered = 0;

    loop {
        write!(
            out,
            "\x1b[1;33mEnter your search query (or type {} to exit): \x1b[0m",
            EXIT_COMMAND
        )?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let line = line.trim();
        if line == EXIT_COMMAND {
            break;
        }

        let words = tokenize_query(line);
        match ranker.ranked_documents(&words).await {
            Ok(results) => {
                write!(out, "{}", format_table(&results))?;
                answered += 1;
            }
            // A broken store should not kill the prompt
            Err(e) => {
                error!(error = %format!("{:#}", e), "search failed");
                writeln!(out, "Search failed: {}", e)?;
            }
        }
    }

    Ok(answered)
}

/// Renders results as a human-readable table.
pub fn format_table(results: &[RankedResult]) -> String {
    if results.is_empty() {
        return "No results found.\n".to_string();
    }

    let rule = "-".repeat(URL_WIDTH + 12);
    let mut table = String::new();
    table.push_str(&format!("{}\n", rule));
    table.push_str(&format!("{:<width$} {:<10}\n", "URL", "RELEVANCE", width = URL_WIDTH));
    table.push_str(&format!("{}\n", rule));
    for result in results {
        table.push_str(&format!(
            "{:<width$} {:<10}\n",
            truncate_url(&result.url),
            result.score,
            width = URL_WIDTH
        ));
    }
    table.push_str(&format!("{}\n", rule));
    table
}

// Truncate URL if too long for display
fn truncate_url(url: &str) -> String {
    if url.chars().count() > URL_WIDTH - 3 {
        let head: String = url.chars().take(URL_WIDTH - 6).collect();
        format!("{}...", head)
    } else {
        url.to_string()
    }
}
