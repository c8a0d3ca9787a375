use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;

use super::*;
use crate::{
    config::{Config, Data, USizeOpt},
    log::LogLevel,
    net::MockReply,
};

const ITEMS: &str = r#"{"data":[{"mal_id":1,"title":"Cowboy Bebop"}]}"#;

fn url(path: &str) -> ArcStr {
    ArcStr::from(format!("http://catalog.test{path}"))
}

fn setup(replies: Vec<MockReply>, policy: RetryPolicy) -> (Fetch, Net, Log) {
    let net = Net::mock(HashMap::from([(url("/top/anime"), replies)]));
    let log = Log::mock();
    let fetch = Fetch::spawn(net.clone(), log.clone(), policy);
    (fetch, net, log)
}

fn count_level(log: &Log, level: LogLevel) -> usize {
    log.get_messages()
        .unwrap()
        .iter()
        .filter(|message| message.level == level && message.scope == "fetch")
        .count()
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_then_success() {
    let (fetch, net, log) = setup(
        vec![
            MockReply::status(429, ""),
            MockReply::status(429, ""),
            MockReply::ok(ITEMS),
        ],
        RetryPolicy::default(),
    );

    let start = Instant::now();
    let items = fetch.execute(url("/top/anime")).await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id(), Some(1));
    assert_eq!(start.elapsed(), Duration::from_millis(1000 + 2000));
    assert_eq!(net.requests().await.unwrap().len(), 3);
    assert_eq!(count_level(&log, LogLevel::Warning), 2);
    assert_eq!(count_level(&log, LogLevel::Error), 0);
}

#[tokio::test(start_paused = true)]
async fn test_not_found_is_not_retried() {
    let (fetch, net, log) = setup(vec![MockReply::status(404, "")], RetryPolicy::default());

    let start = Instant::now();
    let outcome = fetch.execute(url("/top/anime")).await;

    assert_eq!(outcome, Err(FetchError::HttpStatus(404)));
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(net.requests().await.unwrap().len(), 1);
    assert_eq!(count_level(&log, LogLevel::Error), 1);
}

#[tokio::test(start_paused = true)]
async fn test_server_error_fails_without_retry() {
    let (fetch, net, log) = setup(
        vec![MockReply::status(503, ""), MockReply::ok(ITEMS)],
        RetryPolicy::default(),
    );

    let outcome = fetch.execute(url("/top/anime")).await;

    assert_eq!(outcome, Err(FetchError::HttpStatus(503)));
    assert_eq!(net.requests().await.unwrap().len(), 1);
    assert_eq!(count_level(&log, LogLevel::Warning), 0);
    assert_eq!(count_level(&log, LogLevel::Error), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retries_exhausted_after_budget() {
    let (fetch, net, log) = setup(
        vec![MockReply::status(429, "")],
        RetryPolicy::new(2, Duration::from_millis(1000)),
    );

    let start = Instant::now();
    let outcome = fetch.execute(url("/top/anime")).await;

    assert_eq!(
        outcome,
        Err(FetchError::RetriesExhausted(Box::new(FetchError::RateLimited)))
    );
    assert_eq!(net.requests().await.unwrap().len(), 3);
    assert_eq!(start.elapsed(), Duration::from_millis(1000 + 2000));
    assert_eq!(count_level(&log, LogLevel::Warning), 2);
    assert_eq!(count_level(&log, LogLevel::Error), 1);
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_is_retried() {
    let (fetch, net, _) = setup(
        vec![
            MockReply::transport_error("connection reset"),
            MockReply::ok(ITEMS),
        ],
        RetryPolicy::default(),
    );

    let start = Instant::now();
    let items = fetch.execute(url("/top/anime")).await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(start.elapsed(), Duration::from_millis(1000));
    assert_eq!(net.requests().await.unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_exhausts_retries() {
    let (fetch, _, _) = setup(
        vec![MockReply::transport_error("connection reset")],
        RetryPolicy::new(1, Duration::from_millis(200)),
    );

    let outcome = fetch.execute(url("/top/anime")).await;

    let reset = FetchError::Transport("connection reset".to_string());
    assert_eq!(outcome, Err(FetchError::RetriesExhausted(Box::new(reset))));
}

#[tokio::test(start_paused = true)]
async fn test_zero_retries_fails_on_first_rate_limit() {
    let (fetch, net, _) = setup(
        vec![MockReply::status(429, "")],
        RetryPolicy::new(0, Duration::from_millis(1000)),
    );

    let outcome = fetch.execute(url("/top/anime")).await;

    assert_eq!(
        outcome,
        Err(FetchError::RetriesExhausted(Box::new(FetchError::RateLimited)))
    );
    assert_eq!(net.requests().await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_body_is_not_retried() {
    let (fetch, net, _) = setup(
        vec![MockReply::ok("<html>busy</html>")],
        RetryPolicy::default(),
    );

    let outcome = fetch.execute(url("/top/anime")).await;

    assert!(matches!(outcome, Err(FetchError::MalformedResponse(_))));
    assert_eq!(net.requests().await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_cap_is_honoured() {
    let (fetch, net, _) = setup(
        vec![MockReply::status(429, "")],
        RetryPolicy::new(4, Duration::from_millis(1000))
            .with_max_backoff(Duration::from_millis(1500)),
    );

    let start = Instant::now();
    let outcome = fetch.execute(url("/top/anime")).await;

    assert!(matches!(outcome, Err(FetchError::RetriesExhausted(_))));
    assert_eq!(net.requests().await.unwrap().len(), 5);
    assert_eq!(
        start.elapsed(),
        Duration::from_millis(1000 + 1500 + 1500 + 1500)
    );
}

#[tokio::test(start_paused = true)]
async fn test_executions_run_concurrently() {
    let net = Net::mock(HashMap::from([
        (
            url("/top/manga"),
            vec![MockReply::ok(ITEMS).after(Duration::from_secs(5))],
        ),
        (url("/top/anime"), vec![MockReply::ok(ITEMS)]),
    ]));
    let fetch = Fetch::spawn(net, Log::mock(), RetryPolicy::default());

    let start = Instant::now();
    let slow = tokio::spawn({
        let fetch = fetch.clone();
        async move { fetch.execute(url("/top/manga")).await }
    });
    tokio::task::yield_now().await;

    fetch.execute(url("/top/anime")).await.unwrap();
    assert!(start.elapsed() < Duration::from_secs(5));

    slow.await.unwrap().unwrap();
    assert_eq!(start.elapsed(), Duration::from_secs(5));
}

#[test]
fn test_parse_items_envelope() {
    assert_eq!(parse_items(r#"{"data":[]}"#).unwrap(), vec![]);
    assert_eq!(parse_items(r#"{"pagination":{}}"#).unwrap(), vec![]);
    assert_eq!(parse_items(r#"{"data":null}"#).unwrap(), vec![]);
    assert!(matches!(
        parse_items(r#"{"data":{"mal_id":1}}"#),
        Err(FetchError::MalformedResponse(_))
    ));
    assert!(matches!(parse_items("[]"), Err(FetchError::MalformedResponse(_))));
    assert!(matches!(parse_items(""), Err(FetchError::MalformedResponse(_))));
}

#[test]
fn test_item_preserves_unknown_fields() {
    let items = parse_items(
        r#"{"data":[{"mal_id":5,"title":"Berserk","favorites":123,"extra":{"a":[1,2]}}]}"#,
    )
    .unwrap();
    let item = &items[0];
    assert_eq!(item.get("favorites"), Some(&json!(123)));
    assert_eq!(item.get("extra"), Some(&json!({"a": [1, 2]})));
    assert_eq!(serde_json::to_value(item).unwrap()["mal_id"], json!(5));
}

#[test]
fn test_item_accessors() {
    let item: Item = serde_json::from_value(json!({
        "mal_id": 21,
        "title": "One Piece",
        "title_english": "",
        "images": {"webp": {"large_image_url": "https://cdn.test/21.webp"}},
        "score": 8.7,
        "status": "Currently Airing",
        "genres": [{"name": "Action"}, {"name": "Adventure"}],
        "synopsis": "Pirates.",
        "type": "TV",
        "url": "https://myanimelist.net/anime/21"
    }))
    .unwrap();

    assert_eq!(item.id(), Some(21));
    assert_eq!(item.display_title(), Some("One Piece"));
    assert_eq!(item.image_url(), Some("https://cdn.test/21.webp"));
    assert_eq!(item.score(), Some(8.7));
    assert_eq!(item.status(), Some("Currently Airing"));
    assert_eq!(item.genres(), vec!["Action", "Adventure"]);
    assert_eq!(item.synopsis(), Some("Pirates."));
    assert_eq!(item.kind(), Some("TV"));
    assert_eq!(item.url(), Some("https://myanimelist.net/anime/21"));

    let english = json!({
        "title": "Shingeki no Kyojin",
        "title_english": "Attack on Titan"
    });
    let english: Item = serde_json::from_value(english).unwrap();
    assert_eq!(english.display_title(), Some("Attack on Titan"));
    assert!(english.genres().is_empty());
    assert_eq!(english.score(), None);
}

#[test]
fn test_backoff_progression() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.first_backoff(), Duration::from_millis(1000));
    assert_eq!(
        policy.next_backoff(Duration::from_millis(1000)),
        Duration::from_millis(2000)
    );

    let capped = RetryPolicy::new(3, Duration::from_millis(800))
        .with_max_backoff(Duration::from_millis(500));
    assert_eq!(capped.first_backoff(), Duration::from_millis(500));
    assert_eq!(
        capped.next_backoff(Duration::from_millis(500)),
        Duration::from_millis(500)
    );
}

#[tokio::test]
async fn test_policy_from_config() {
    let config = Config::mock(Data::default());
    let policy = RetryPolicy::from_config(&config).await;
    assert_eq!(policy, RetryPolicy::default());

    let mut data = Data::default();
    data.set_usize(USizeOpt::MaxRetries, 5);
    data.set_usize(USizeOpt::InitialBackoffMs, 250);
    data.set_usize(USizeOpt::MaxBackoffMs, 2000);
    let policy = RetryPolicy::from_config(&Config::mock(data)).await;
    assert_eq!(
        policy,
        RetryPolicy::new(5, Duration::from_millis(250))
            .with_max_backoff(Duration::from_millis(2000))
    );
}

#[tokio::test(start_paused = true)]
async fn test_mock_serves_scripted_outcomes() {
    let fetch = Fetch::mock(HashMap::new());
    fetch
        .script(
            url("/anime?q=x"),
            vec![
                MockOutcome::failure(FetchError::HttpStatus(500)),
                MockOutcome::success(vec![Item::default()])
                    .after(Duration::from_millis(300)),
            ],
        )
        .await;

    assert_eq!(
        fetch.execute(url("/anime?q=x")).await,
        Err(FetchError::HttpStatus(500))
    );
    let start = Instant::now();
    assert_eq!(fetch.execute(url("/anime?q=x")).await.unwrap().len(), 1);
    assert_eq!(start.elapsed(), Duration::from_millis(300));
    assert!(matches!(
        fetch.execute(url("/missing")).await,
        Err(FetchError::Transport(_))
    ));
    assert_eq!(fetch.requests().await.unwrap().len(), 3);
}

#[test]
fn test_retryable_errors() {
    assert!(FetchError::Transport("x".into()).is_retryable());
    assert!(FetchError::RateLimited.is_retryable());
    assert!(!FetchError::HttpStatus(500).is_retryable());
    assert!(!FetchError::MalformedResponse("x".into()).is_retryable());
    let exhausted = FetchError::RetriesExhausted(Box::new(FetchError::RateLimited));
    assert!(!exhausted.is_retryable());
}
