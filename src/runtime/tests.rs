//! Tests for the feed runtime

use super::*;
use crate::config::FeedConfig;
use crate::error::{Error, Result, TIMEOUT_MESSAGE};
use crate::http::PageSource;
use crate::pagination::{PageRequest, PageState};
use crate::types::{Item, Sentinel};
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

/// Canned answer for one request
enum Reply {
    Items(u32),
    Empty,
    Status(u16),
    Hang,
}

/// Page source answering from a script, recording every request
#[derive(Clone, Default)]
struct Scripted {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    calls: Arc<Mutex<Vec<PageRequest>>>,
}

impl Scripted {
    fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
            calls: Arc::default(),
        }
    }

    fn pages(&self) -> Vec<u32> {
        self.calls.lock().unwrap().iter().map(|r| r.page).collect()
    }
}

#[async_trait]
impl PageSource for Scripted {
    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<Item>> {
        let reply = {
            let mut calls = self.calls.lock().unwrap();
            let start = calls.len() as u32 * 100;
            calls.push(request);
            let reply = self.replies.lock().unwrap().pop_front();
            (reply, start)
        };

        match reply {
            (Some(Reply::Items(count)), start) => {
                Ok((start..start + count).map(|id| json!({ "id": id })).collect())
            }
            (Some(Reply::Empty) | None, _) => Ok(Vec::new()),
            (Some(Reply::Status(status)), _) => Err(Error::http_status(status, "")),
            (Some(Reply::Hang), _) => std::future::pending().await,
        }
    }
}

fn config() -> FeedConfig {
    FeedConfig::builder()
        .page_size(20)
        .timeout(Duration::from_secs(10))
        .max_attempts(3)
        .backoff(Duration::from_millis(1000), 2.0)
        .build()
}

#[tokio::test(start_paused = true)]
async fn test_mount_loads_first_page() {
    let source = Scripted::new([Reply::Items(20)]);
    let feed = Feed::spawn(source.clone(), &config());
    let handle = feed.handle();

    handle.mount().unwrap();
    let snapshot = handle.wait_for(|s| s.len() == 20 && !s.loading).await.unwrap();

    assert_eq!(snapshot.page_index, 1);
    assert!(snapshot.has_more);
    assert_eq!(source.pages(), vec![1]);
    assert_eq!(source.calls.lock().unwrap()[0].limit, 20);
}

#[tokio::test(start_paused = true)]
async fn test_visible_sentinel_scrolls_to_end() {
    let source = Scripted::new([Reply::Items(20), Reply::Items(20), Reply::Items(5), Reply::Empty]);
    let feed = Feed::spawn(source.clone(), &config());
    let handle = feed.handle();

    handle.attach_sentinel(Sentinel(1)).unwrap();
    handle.mount().unwrap();
    handle.wait_for(|s| s.len() == 20).await.unwrap();
    handle.sentinel_visible(Sentinel(1), true).unwrap();

    let snapshot = handle.wait_for(|s| !s.has_more && !s.loading).await.unwrap();
    assert_eq!(snapshot.len(), 45);
    assert_eq!(source.pages(), vec![1, 2, 3, 4]);
    assert!(snapshot.error.is_none());

    let state = feed.close().await.unwrap();
    assert_eq!(state.len(), 45);
    assert!(!state.has_more());
}

#[tokio::test(start_paused = true)]
async fn test_timeouts_retry_with_backoff_then_stop() {
    let source = Scripted::new([Reply::Hang, Reply::Hang, Reply::Hang, Reply::Hang, Reply::Items(3)]);
    let feed = Feed::spawn(source.clone(), &config());
    let handle = feed.handle();
    let start = tokio::time::Instant::now();

    handle.mount().unwrap();
    let snapshot = handle.wait_for(|s| s.is_terminal()).await.unwrap();

    // 4 timeouts of 10s plus 1s + 2s + 4s of backoff
    assert_eq!(start.elapsed(), Duration::from_secs(47));
    assert_eq!(snapshot.error.as_deref(), Some(TIMEOUT_MESSAGE));
    assert_eq!(snapshot.retry_attempt, 3);
    assert_eq!(source.pages(), vec![1, 1, 1, 1]);

    // Nothing else happens on its own
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(source.pages().len(), 4);

    handle.retry().unwrap();
    let snapshot = handle.wait_for(|s| s.len() == 3).await.unwrap();
    assert_eq!(snapshot.retry_attempt, 0);
    assert!(snapshot.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_offline_cancels_pending_retry() {
    let source = Scripted::new([Reply::Status(500), Reply::Items(20)]);
    let feed = Feed::spawn(source.clone(), &config());
    let handle = feed.handle();

    handle.mount().unwrap();
    handle.wait_for(|s| s.retry_pending).await.unwrap();
    handle.set_online(false).unwrap();
    let snapshot = handle.wait_for(|s| !s.is_online).await.unwrap();
    assert!(!snapshot.retry_pending);

    tokio::time::sleep(Duration::from_secs(30)).await;
    handle.set_online(true).unwrap();
    let snapshot = handle.wait_for(|s| s.is_online).await.unwrap();
    assert!(snapshot.error.is_none());

    // Coming back online does not fetch by itself
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(source.pages(), vec![1]);

    handle.retry().unwrap();
    handle.wait_for(|s| s.len() == 20).await.unwrap();
    assert_eq!(source.pages(), vec![1, 1]);
}

#[tokio::test(start_paused = true)]
async fn test_restore_skips_refetch() {
    let source = Scripted::new([Reply::Items(20)]);
    let items: Vec<Item> = (0..40).map(|id| json!({ "id": id })).collect();
    let options = FeedOptions {
        online: true,
        restore: Some(PageState::restored(items, 2, true)),
    };
    let feed = Feed::spawn_with(source.clone(), &config(), options);
    let handle = feed.handle();

    handle.mount().unwrap();
    handle.attach_sentinel(Sentinel(5)).unwrap();
    handle.wait_for(|s| s.sentinel == Some(Sentinel(5))).await.unwrap();
    assert!(source.pages().is_empty());
    assert_eq!(handle.snapshot().len(), 40);

    handle.sentinel_visible(Sentinel(5), true).unwrap();
    handle.wait_for(|s| s.len() == 60).await.unwrap();
    assert_eq!(source.pages().first(), Some(&3));
}

#[tokio::test(start_paused = true)]
async fn test_handle_closed_after_teardown() {
    let feed = Feed::spawn(Scripted::default(), &config());
    let handle = feed.handle();

    assert_ok!(handle.teardown());
    assert_ok!(feed.close().await);

    assert!(matches!(handle.retry(), Err(Error::Closed)));
    assert_err!(handle.mount());
    assert_err!(handle.wait_for(|_| false).await);
}
