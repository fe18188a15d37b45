//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: HTTP page source → feed runtime → snapshots

use gallery_feed::error::TIMEOUT_MESSAGE;
use gallery_feed::{
    Feed, FeedConfig, FeedOptions, GallerySnapshot, HttpPageSource, PageSource, Sentinel,
};
use gallery_feed::pagination::PageRequest;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SENTINEL: Sentinel = Sentinel(7);

fn photos(page: u32, count: u32) -> Value {
    let start = (page - 1) * 20;
    Value::Array(
        (start..start + count)
            .map(|id| {
                json!({
                    "id": id.to_string(),
                    "author": format!("Author {id}"),
                    "download_url": format!("https://picsum.photos/id/{id}/400/300")
                })
            })
            .collect(),
    )
}

fn config_for(server: &MockServer) -> FeedConfig {
    FeedConfig::builder()
        .base_url(server.uri())
        .path("/v2/list")
        .page_size(20)
        .timeout(Duration::from_secs(2))
        .max_attempts(3)
        .backoff(Duration::from_millis(20), 2.0)
        .build()
}

async fn mount_page(server: &MockServer, page: u32, body: Value) {
    Mock::given(method("GET"))
        .and(path("/v2/list"))
        .and(query_param("page", page.to_string()))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn wait(
    feed: &Feed,
    condition: impl FnMut(&GallerySnapshot) -> bool,
) -> GallerySnapshot {
    tokio::time::timeout(Duration::from_secs(10), feed.handle().wait_for(condition))
        .await
        .expect("feed did not reach the expected state")
        .unwrap()
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

// ============================================================================
// Page Source Integration Tests
// ============================================================================

#[tokio::test]
async fn test_page_source_fetches_requested_page() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 2, photos(2, 20)).await;

    let source = HttpPageSource::new(&config_for(&mock_server)).unwrap();
    let items = source.fetch_page(PageRequest::new(2, 20)).await.unwrap();

    assert_eq!(items.len(), 20);
    assert_eq!(items[0]["id"], "20");
}

// ============================================================================
// Feed Integration Tests
// ============================================================================

#[tokio::test]
async fn test_scroll_until_exhausted() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, photos(1, 20)).await;
    mount_page(&mock_server, 2, photos(2, 20)).await;
    mount_page(&mock_server, 3, photos(3, 7)).await;
    mount_page(&mock_server, 4, json!([])).await;

    let config = config_for(&mock_server);
    let feed = Feed::spawn(HttpPageSource::new(&config).unwrap(), &config);
    let handle = feed.handle();

    handle.attach_sentinel(SENTINEL).unwrap();
    handle.mount().unwrap();
    wait(&feed, |s| s.len() == 20 && !s.loading).await;

    // Keeping the sentinel on screen pulls every remaining page
    handle.sentinel_visible(SENTINEL, true).unwrap();
    let snapshot = wait(&feed, |s| !s.has_more && s.is_settled()).await;

    assert_eq!(snapshot.len(), 47);
    assert_eq!(snapshot.page_index, 4);
    assert_eq!(snapshot.error, None);
    assert_eq!(snapshot.items[46]["id"], "46");
    assert_eq!(request_count(&mock_server).await, 4);

    // Further sightings do nothing once the data has ended
    handle.sentinel_visible(SENTINEL, false).unwrap();
    handle.sentinel_visible(SENTINEL, true).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(request_count(&mock_server).await, 4);

    let state = feed.close().await.unwrap();
    assert_eq!(state.len(), 47);
}

#[tokio::test]
async fn test_server_error_recovers_on_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/list"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, 1, photos(1, 20)).await;

    let config = config_for(&mock_server);
    let feed = Feed::spawn(HttpPageSource::new(&config).unwrap(), &config);

    feed.handle().mount().unwrap();
    let snapshot = wait(&feed, |s| s.len() == 20).await;

    assert_eq!(snapshot.error, None);
    assert_eq!(snapshot.retry_attempt, 0);
    assert_eq!(request_count(&mock_server).await, 2);
}

#[tokio::test]
async fn test_retries_stop_at_cap() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/list"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&mock_server)
        .await;

    let config = config_for(&mock_server);
    let feed = Feed::spawn(HttpPageSource::new(&config).unwrap(), &config);

    feed.handle().mount().unwrap();
    let snapshot = wait(&feed, GallerySnapshot::is_terminal).await;

    assert_eq!(
        snapshot.error.as_deref(),
        Some("Failed to load photos: HTTP 503 Service Unavailable: down")
    );
    assert_eq!(snapshot.retry_attempt, 3);
    assert!(snapshot.is_empty());

    // One initial request plus three retries, then nothing
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(request_count(&mock_server).await, 4);
}

#[tokio::test]
async fn test_manual_retry_after_cap() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/list"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, 1, photos(1, 20)).await;

    let mut config = config_for(&mock_server);
    config.retry.max_attempts = 1;
    let feed = Feed::spawn(HttpPageSource::new(&config).unwrap(), &config);

    feed.handle().mount().unwrap();
    wait(&feed, GallerySnapshot::is_terminal).await;
    assert_eq!(request_count(&mock_server).await, 2);

    feed.handle().retry().unwrap();
    let snapshot = wait(&feed, |s| s.len() == 20).await;
    assert_eq!(snapshot.error, None);
    assert_eq!(snapshot.retry_attempt, 0);
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(photos(1, 20))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let config = FeedConfig::builder()
        .base_url(mock_server.uri())
        .path("/v2/list")
        .timeout(Duration::from_millis(100))
        .max_attempts(1)
        .backoff(Duration::from_millis(10), 2.0)
        .build();
    let feed = Feed::spawn(HttpPageSource::new(&config).unwrap(), &config);

    feed.handle().mount().unwrap();
    let snapshot = wait(&feed, GallerySnapshot::is_terminal).await;

    assert_eq!(snapshot.error.as_deref(), Some(TIMEOUT_MESSAGE));
    assert!(!snapshot.loading);
}

#[tokio::test]
async fn test_back_navigation_skips_refetch() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, photos(1, 20)).await;
    mount_page(&mock_server, 2, photos(2, 20)).await;

    let config = config_for(&mock_server);
    let feed = Feed::spawn(HttpPageSource::new(&config).unwrap(), &config);
    feed.handle().mount().unwrap();
    wait(&feed, |s| s.len() == 20 && !s.loading).await;

    let mut state = feed.close().await.unwrap();
    state.set_came_from_back();

    let options = FeedOptions {
        online: true,
        restore: Some(state),
    };
    let feed = Feed::spawn_with(HttpPageSource::new(&config).unwrap(), &config, options);
    let handle = feed.handle();
    handle.attach_sentinel(SENTINEL).unwrap();
    handle.mount().unwrap();
    let snapshot = wait(&feed, |s| s.mounted).await;

    assert_eq!(snapshot.len(), 20);
    assert_eq!(request_count(&mock_server).await, 1);

    // Scrolling on still loads the next page
    handle.sentinel_visible(SENTINEL, true).unwrap();
    let snapshot = wait(&feed, |s| s.len() == 40).await;
    assert_eq!(snapshot.page_index, 2);
    assert_eq!(request_count(&mock_server).await, 2);
}

#[tokio::test]
async fn test_offline_start_shows_message_without_requests() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, photos(1, 20)).await;

    let config = config_for(&mock_server);
    let options = FeedOptions {
        online: false,
        restore: None,
    };
    let feed = Feed::spawn_with(HttpPageSource::new(&config).unwrap(), &config, options);
    let handle = feed.handle();

    handle.mount().unwrap();
    let snapshot = wait(&feed, |s| s.mounted).await;
    assert_eq!(
        snapshot.error.as_deref(),
        Some(gallery_feed::error::OFFLINE_MESSAGE)
    );
    assert_eq!(request_count(&mock_server).await, 0);

    handle.set_online(true).unwrap();
    handle.retry().unwrap();
    let snapshot = wait(&feed, |s| s.len() == 20).await;
    assert_eq!(snapshot.error, None);
}
