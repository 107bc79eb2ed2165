// The HTTP search surface, driven in-process with tower's `oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use spider_search::index::TermCount;
use spider_search::search::{router, serve, Ranker};
use spider_search::store::{MemoryStore, Store};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::ServiceExt;

async fn app() -> Router {
    let store = Arc::new(MemoryStore::new());
    let a = store.insert_document("https://a.test/", "").await.unwrap();
    store.insert_words(a, &[TermCount::new("ocean", 3)]).await.unwrap();
    let b = store.insert_document("https://b.test/", "").await.unwrap();
    store
        .insert_words(b, &[TermCount::new("ocean", 1), TermCount::new("blue", 4)])
        .await
        .unwrap();
    router(Ranker::new(store), Duration::from_secs(5))
}

async fn send(method: Method, uri: &str, body: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app().await.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_get_root_serves_form() {
    let (status, body) = send(Method::GET, "/", "").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<form"));
    assert!(body.contains(r#"name="query""#));
}

#[tokio::test]
async fn test_post_query_returns_ranked_list() {
    let (status, body) = send(Method::POST, "/", "query=Ocean+blue%21").await;
    assert_eq!(status, StatusCode::OK);

    // b: 1 + 4 = 5, a: 3
    let b = body.find("https://b.test/").expect("b listed");
    let a = body.find("https://a.test/").expect("a listed");
    assert!(b < a);
    assert!(body.contains("Relevance: 5"));
    assert!(body.contains("Relevance: 3"));
}

#[tokio::test]
async fn test_post_without_matches_says_so() {
    let (status, body) = send(Method::POST, "/", "query=desert").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No results found."));
}

#[tokio::test]
async fn test_post_without_query_is_bad_request() {
    let (status, _) = send(Method::POST, "/", "page=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_favicon_is_empty_ok() {
    let (status, body) = send(Method::GET, "/favicon.ico", "").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_other_methods_are_not_allowed() {
    let (status, _) = send(Method::PUT, "/", "").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = send(Method::DELETE, "/anything", "").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_served_over_tcp_until_shutdown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(serve(listener, app().await, async move {
        let _ = stop_rx.await;
    }));

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{}/", addr))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("query=blue")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("https://b.test/"));
    assert!(!body.contains("https://a.test/"));

    stop_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop after shutdown")
        .unwrap()
        .unwrap();
}
