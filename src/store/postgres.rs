// src/store/postgres.rs
// =============================================================================
// A Store backed by PostgreSQL.
//
// Schema (created on connect if missing):
//
//   documents(id BIGSERIAL PK, url TEXT UNIQUE, content TEXT)
//   words(id BIGSERIAL PK, document_id -> documents.id, word TEXT, frequency INT)
//
// - Document upserts are a single INSERT ... ON CONFLICT statement, so two
//   writers can never create two rows for one URL
// - Term replacement is ONE statement: a DELETE in a CTE plus an INSERT
//   from UNNEST'ed arrays, so it is atomic and costs one round trip
//
// All workers and searches share one Client without a lock; tokio-postgres
// pipelines concurrent queries over the connection.
// =============================================================================

use super::{DocumentId, Posting, Store};
use crate::config::DatabaseSettings;
use crate::index::{sanitize_content, TermCount};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio_postgres::{Client, NoTls};
use tracing::{error, info};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS documents (
        id BIGSERIAL PRIMARY KEY,
        url TEXT NOT NULL UNIQUE,
        content TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS words (
        id BIGSERIAL PRIMARY KEY,
        document_id BIGINT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
        word TEXT NOT NULL,
        frequency INT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS words_word_idx ON words (word);
    CREATE INDEX IF NOT EXISTS words_document_id_idx ON words (document_id);
";

const UPSERT_DOCUMENT: &str = "
    INSERT INTO documents (url, content) VALUES ($1, $2)
    ON CONFLICT (url) DO UPDATE SET content = EXCLUDED.content
    RETURNING id";

const REPLACE_WORDS: &str = "
    WITH cleared AS (DELETE FROM words WHERE document_id = $1::bigint)
    INSERT INTO words (document_id, word, frequency)
    SELECT $1::bigint, t.word, t.frequency
    FROM UNNEST($2::text[], $3::int[]) AS t(word, frequency)";

const SELECT_POSTINGS: &str = "
    SELECT d.url, w.frequency
    FROM words w
    JOIN documents d ON d.id = w.document_id
    WHERE w.word = $1";

pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    /// Connects and makes sure the schema exists.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(&settings.connection_string(), NoTls)
            .await
            .with_context(|| {
                format!(
                    "failed to connect to Postgres at {}:{}/{}",
                    settings.host, settings.port, settings.name
                )
            })?;

        // The connection object drives the socket; it must be polled on its own task
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                error!(%err, "postgres connection error");
            }
        });

        client
            .batch_execute(SCHEMA)
            .await
            .context("failed to initialize database schema")?;
        info!(host = %settings.host, database = %settings.name, "database initialized");

        Ok(Self { client })
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn insert_document(&self, url: &str, content: &str) -> Result<DocumentId> {
        let content = sanitize_content(content);
        let row = self
            .client
            .query_one(UPSERT_DOCUMENT, &[&url, &content])
            .await
            .with_context(|| format!("failed to upsert document {}", url))?;
        Ok(row.get(0))
    }

    async fn insert_words(&self, document: DocumentId, terms: &[TermCount]) -> Result<()> {
        let (words, frequencies) = term_columns(terms);
        self.client
            .execute(REPLACE_WORDS, &[&document, &words, &frequencies])
            .await
            .with_context(|| format!("failed to replace words of document {}", document))?;
        Ok(())
    }

    async fn postings(&self, word: &str) -> Result<Vec<Posting>> {
        let rows = self
            .client
            .query(SELECT_POSTINGS, &[&word])
            .await
            .with_context(|| format!("failed to look up word {:?}", word))?;

        Ok(rows
            .iter()
            .map(|row| {
                let frequency: i32 = row.get(1);
                Posting {
                    url: row.get(0),
                    frequency: u32::try_from(frequency).unwrap_or(0),
                }
            })
            .collect())
    }
}

// Splits terms into the two parallel arrays bound to REPLACE_WORDS
fn term_columns(terms: &[TermCount]) -> (Vec<&str>, Vec<i32>) {
    terms
        .iter()
        .map(|term| {
            (
                term.word.as_str(),
                i32::try_from(term.frequency).unwrap_or(i32::MAX),
            )
        })
        .unzip()
}
