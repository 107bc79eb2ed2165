// src/search/server.rs
// =============================================================================
// The minimal HTTP search surface (axum).
//
// Routes:
//   GET  /             -> the search form
//   POST /             -> form body "query=..." -> HTML list of results
//   GET  /favicon.ico  -> empty 200
//   anything else      -> 405 Method Not Allowed
//
// axum/hyper run every connection as its own task. Each request is bounded
// by a deadline (tower-http TimeoutLayer); a client that stalls gets a
// 408 instead of holding the connection forever.
// =============================================================================

use super::query::tokenize_query;
use super::rank::{RankedResult, Ranker};
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

const SEARCH_FORM: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Search</title>
</head>
<body>
  <h1>Search</h1>
  <form method="post" action="/">
    <input type="text" name="query" autofocus>
    <button type="submit">Search</button>
  </form>
</body>
</html>
"#;

/// Builds the application router.
pub fn router(ranker: Ranker, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(search_form).post(search))
        .route("/favicon.ico", get(favicon))
        .fallback(method_not_allowed)
        .with_state(ranker)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Serves `app` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("listener has no local address")?;
    info!(%addr, "search engine running");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;
    info!("search engine stopped");
    Ok(())
}

async fn search_form() -> Html<&'static str> {
    Html(SEARCH_FORM)
}

async fn favicon() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Html("<html><body><h1>405 Method Not Allowed</h1></body></html>"),
    )
        .into_response()
}

async fn search(State(ranker): State<Ranker>, body: String) -> Response {
    let Some(query) = query_param(&body) else {
        debug!("query parameter not found in request body");
        return (
            StatusCode::BAD_REQUEST,
            Html("<html><body><h1>400 Bad Request</h1><p>Missing query parameter.</p></body></html>"),
        )
            .into_response();
    };

    let words = tokenize_query(&query);
    debug!(%query, words = words.len(), "search request");

    match ranker.ranked_documents(&words).await {
        Ok(results) => Html(render_results(&query, &results)).into_response(),
        Err(e) => {
            error!(error = %format!("{:#}", e), "search failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<html><body><h1>500 Internal Server Error</h1></body></html>"),
            )
                .into_response()
        }
    }
}

// Pulls `query` out of an application/x-www-form-urlencoded body
fn query_param(body: &str) -> Option<String> {
    url::form_urlencoded::parse(body.as_bytes())
        .find(|(key, _)| key == "query")
        .map(|(_, value)| value.into_owned())
}

fn render_results(query: &str, results: &[RankedResult]) -> String {
    let mut page = String::from("<html><body><h1>Search Results</h1>");
    page.push_str(&format!("<p>Query: {}</p>", escape_html(query)));

    if results.is_empty() {
        page.push_str("<p>No results found.</p>");
    } else {
        page.push_str("<ul>");
        for result in results {
            let url = escape_html(&result.url);
            page.push_str(&format!(
                "<li><a href=\"{url}\">{url}</a> - Relevance: {}</li>",
                result.score
            ));
        }
        page.push_str("</ul>");
    }

    page.push_str("</body></html>");
    page
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_is_url_decoded() {
        assert_eq!(query_param("query=ocean+blue%21").as_deref(), Some("ocean blue!"));
        assert_eq!(query_param("page=2&query=sea").as_deref(), Some("sea"));
        assert_eq!(query_param("page=2"), None);
        assert_eq!(query_param(""), None);
    }

    #[test]
    fn test_results_are_escaped() {
        let page = render_results(
            "<b>",
            &[RankedResult { url: "https://a.test/?a=1&b=\"2\"".to_string(), score: 5 }],
        );
        assert!(page.contains("Query: &lt;b&gt;"));
        assert!(page.contains("https://a.test/?a=1&amp;b=&quot;2&quot;"));
        assert!(page.contains("Relevance: 5"));
    }

    #[test]
    fn test_empty_results_page() {
        assert!(render_results("nothing", &[]).contains("No results found."));
    }
}
