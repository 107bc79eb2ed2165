// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the CLI structure is described by the structs and
// enums below, and clap generates the parsing, --help and --version.
//
//   spider-search [--config Config.ini] run
//   spider-search [--config Config.ini] crawl [--seed URL] [--max-depth N]
//   spider-search [--config Config.ini] search <WORDS>... [--json]
//   spider-search [--config Config.ini] serve
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "spider-search",
    version,
    about = "Crawl a website, index its words and search them",
    long_about = "spider-search crawls a website from a seed URL up to a maximum depth, \
                  indexes the words of every page and answers keyword queries from the \
                  console or over HTTP."
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, short, global = true, default_value = "Config.ini")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl, then serve HTTP searches while the console prompt is open (default)
    Run,

    /// Crawl and index the configured site, then exit
    ///
    /// Example: spider-search crawl --seed https://example.com --max-depth 2
    Crawl {
        /// Seed URL (overrides spider.start_url)
        #[arg(long)]
        seed: Option<String>,

        /// Maximum crawl depth (overrides spider.recursion_depth)
        ///
        /// The seed is depth 0: --max-depth 1 indexes just the seed page,
        /// --max-depth 2 also the pages it links to, and so on.
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Run one query against the index and print the ranked URLs
    ///
    /// Example: spider-search search ocean blue --json
    Search {
        /// Query words
        #[arg(required = true)]
        words: Vec<String>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Serve the HTTP search page until Ctrl-C
    Serve,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_and_config() {
        let cli = Cli::parse_from(["spider-search"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("Config.ini"));
    }

    #[test]
    fn test_crawl_overrides() {
        let cli = Cli::parse_from([
            "spider-search",
            "crawl",
            "--seed",
            "https://example.com",
            "--max-depth",
            "3",
            "--config",
            "other.ini",
        ]);
        assert_eq!(cli.config, PathBuf::from("other.ini"));
        match cli.command {
            Some(Commands::Crawl { seed, max_depth }) => {
                assert_eq!(seed.as_deref(), Some("https://example.com"));
                assert_eq!(max_depth, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_search_requires_words() {
        assert!(Cli::try_parse_from(["spider-search", "search"]).is_err());
        let cli = Cli::parse_from(["spider-search", "search", "ocean", "blue", "--json"]);
        match cli.command {
            Some(Commands::Search { words, json }) => {
                assert_eq!(words, vec!["ocean", "blue"]);
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
