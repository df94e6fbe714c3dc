//! HTTP-level tests of the retry and fallback policy

use std::time::Duration;

use url::Url;

use corkboard::error::Error;
use corkboard::fetch::FeedFetcher;
use corkboard::traits::EventSource;

const MINIMAL_FEED: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n";

fn feed_url(server: &mockito::ServerGuard) -> Url {
    Url::parse(&format!("{}/basic.ics", server.url())).unwrap()
}

#[tokio::test]
async fn a_healthy_endpoint_succeeds_on_the_first_attempt() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/basic.ics")
        .with_status(200)
        .with_header("content-type", "text/calendar")
        .with_body(MINIMAL_FEED)
        .expect(1)
        .create_async()
        .await;

    let fetcher = FeedFetcher::new(reqwest::Client::new(), feed_url(&server), vec![]);
    let text = fetcher.fetch_raw().await.unwrap();

    assert!(text.contains("BEGIN:VCALENDAR"));
    mock.assert_async().await;
}

#[tokio::test]
async fn the_fallback_endpoint_wins_when_the_first_is_down() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut broken = mockito::Server::new_async().await;
    let mut healthy = mockito::Server::new_async().await;

    // The broken endpoint burns its whole budget: 1 attempt + 2 retries
    let broken_mock = broken
        .mock("GET", "/basic.ics")
        .with_status(503)
        .expect(3)
        .create_async()
        .await;
    let healthy_mock = healthy
        .mock("GET", "/basic.ics")
        .with_status(200)
        .with_header("content-type", "text/calendar")
        .with_body(MINIMAL_FEED)
        .expect(1)
        .create_async()
        .await;

    let fetcher = FeedFetcher::new(
        reqwest::Client::new(),
        feed_url(&broken),
        vec![feed_url(&healthy)],
    )
    .with_retry_policy(2, Duration::from_millis(1));

    let text = fetcher.fetch_raw().await.unwrap();

    assert!(text.contains("BEGIN:VCALENDAR"));
    broken_mock.assert_async().await;
    healthy_mock.assert_async().await;
}

#[tokio::test]
async fn exhausting_every_endpoint_reports_the_attempt_count() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/basic.ics")
        .with_status(500)
        .expect(2)
        .create_async()
        .await;

    let fetcher = FeedFetcher::new(reqwest::Client::new(), feed_url(&server), vec![])
        .with_retry_policy(1, Duration::from_millis(1));

    match fetcher.fetch_raw().await {
        Err(Error::FetchExhausted {
            attempts,
            last_error,
        }) => {
            assert_eq!(attempts, 2);
            assert!(last_error.contains("500"));
        }
        other => panic!("expected FetchExhausted, got {:?}", other.map(|_| "a feed")),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn an_html_error_page_is_not_a_feed() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut pretender = mockito::Server::new_async().await;
    let mut healthy = mockito::Server::new_async().await;

    // 200 OK, but the body is a relay's error page rather than a calendar
    let pretender_mock = pretender
        .mock("GET", "/basic.ics")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>Be right back</html>")
        .expect(1)
        .create_async()
        .await;
    let healthy_mock = healthy
        .mock("GET", "/basic.ics")
        .with_status(200)
        .with_header("content-type", "text/calendar")
        .with_body(MINIMAL_FEED)
        .expect(1)
        .create_async()
        .await;

    let fetcher = FeedFetcher::new(
        reqwest::Client::new(),
        feed_url(&pretender),
        vec![feed_url(&healthy)],
    )
    .with_retry_policy(0, Duration::from_millis(1));

    let text = fetcher.fetch_raw().await.unwrap();

    assert!(text.contains("BEGIN:VCALENDAR"));
    pretender_mock.assert_async().await;
    healthy_mock.assert_async().await;
}
