use std::collections::HashMap;

use serde_json::json;

use super::*;
use crate::{
    catalog::{self, RequestDescriptor},
    fetch::{FetchError, Item, MockOutcome, RetryPolicy},
    log::LogLevel,
    net::{MockReply, Net},
};

const BASE: &str = "http://catalog.test";
const NOTIFICATION: Duration = Duration::from_millis(3000);

fn url_for(view: View, text: &str) -> ArcStr {
    let descriptor = RequestDescriptor::new(view, text);
    catalog::build_url(BASE, &descriptor).unwrap()
}

fn item(id: u64) -> Item {
    serde_json::from_value(json!({ "mal_id": id })).unwrap()
}

fn after(outcome: MockOutcome, millis: u64) -> Vec<MockOutcome> {
    vec![outcome.after(Duration::from_millis(millis))]
}

fn ids(state: &OrchestratorState) -> Vec<u64> {
    state.items.iter().filter_map(Item::id).collect()
}

fn spawn(fetch: Fetch) -> (Orchestrator, Log) {
    let log = Log::mock();
    let orchestrator = Orchestrator::spawn(fetch, log.clone(), ArcStr::from(BASE), NOTIFICATION);
    (orchestrator, log)
}

async fn settled(orchestrator: &Orchestrator) -> OrchestratorState {
    let mut rx = orchestrator.watch().await.unwrap();
    let state = rx.wait_for(|state| !state.is_loading).await.unwrap();
    state.clone()
}

#[tokio::test(start_paused = true)]
async fn test_listing_success() {
    let net = Net::mock(HashMap::from([(
        url_for(View::Anime, ""),
        vec![MockReply::ok(r#"{"data":[{"mal_id":1}]}"#)],
    )]));
    let fetch = Fetch::spawn(net.clone(), Log::mock(), RetryPolicy::default());
    let (orchestrator, _) = spawn(fetch);

    orchestrator.set_view(View::Anime).await.unwrap();
    let state = settled(&orchestrator).await;

    assert_eq!(ids(&state), vec![1]);
    assert!(!state.is_loading);
    assert_eq!(state.phase, Phase::Succeeded);
    assert_eq!(state.notification, None);
    assert_eq!(
        net.requests().await.unwrap(),
        vec![ArcStr::from("http://catalog.test/top/anime")]
    );
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_search_keeps_items_and_notifies_once() {
    let net = Net::mock(HashMap::from([
        (
            url_for(View::Anime, ""),
            vec![MockReply::ok(r#"{"data":[{"mal_id":7}]}"#)],
        ),
        (
            url_for(View::Manga, "robot"),
            vec![MockReply::status(429, "")],
        ),
    ]));
    let fetch = Fetch::spawn(net.clone(), Log::mock(), RetryPolicy::default());
    let (orchestrator, log) = spawn(fetch);
    let mut notifications = orchestrator.subscribe().await.unwrap();

    orchestrator.set_view(View::Anime).await.unwrap();
    assert_eq!(ids(&settled(&orchestrator).await), vec![7]);

    orchestrator
        .set_search_text(ArcStr::from("robot"))
        .await
        .unwrap();
    orchestrator.set_view(View::Manga).await.unwrap();
    let state = settled(&orchestrator).await;

    assert_eq!(ids(&state), vec![7]);
    assert!(!state.is_loading);
    assert_eq!(state.phase, Phase::Failed);
    assert_eq!(state.view, View::Manga);
    assert_eq!(
        state.notification.as_ref().map(|n| &*n.message),
        Some(NETWORK_ISSUE)
    );

    let notification = notifications.recv().await.unwrap();
    assert_eq!(&*notification.message, NETWORK_ISSUE);
    assert!(notifications.try_recv().is_err());

    let robot_requests = net
        .requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|url| url.contains("robot"))
        .count();
    assert_eq!(robot_requests, 4);
    assert!(
        log.get_messages()
            .unwrap()
            .iter()
            .any(|m| m.level == LogLevel::Error && m.scope == "orchestrator")
    );
}

#[tokio::test(start_paused = true)]
async fn test_stale_outcome_is_discarded() {
    let fetch = Fetch::mock(HashMap::from([
        (
            url_for(View::Anime, ""),
            after(MockOutcome::success(vec![item(24), item(25)]), 2000),
        ),
        (
            url_for(View::Anime, "robot"),
            after(MockOutcome::success(vec![item(1), item(2)]), 100),
        ),
    ]));
    let (orchestrator, log) = spawn(fetch);

    orchestrator.set_view(View::Anime).await.unwrap();
    orchestrator
        .set_search_text(ArcStr::from("robot"))
        .await
        .unwrap();
    orchestrator.submit_search().await.unwrap();

    let state = settled(&orchestrator).await;
    assert_eq!(ids(&state), vec![1, 2]);

    tokio::time::sleep(Duration::from_secs(3)).await;
    let state = orchestrator.state().await.unwrap();
    assert_eq!(ids(&state), vec![1, 2]);
    assert!(!state.is_loading);
    assert_eq!(state.phase, Phase::Succeeded);
    assert!(
        log.get_messages()
            .unwrap()
            .iter()
            .any(|m| m.message.starts_with("Discarding superseded outcome"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_stale_outcome_keeps_newer_query_loading() {
    let fetch = Fetch::mock(HashMap::from([
        (
            url_for(View::Anime, ""),
            after(MockOutcome::success(vec![item(1)]), 100),
        ),
        (
            url_for(View::Manga, ""),
            after(MockOutcome::success(vec![item(2)]), 2000),
        ),
    ]));
    let (orchestrator, _) = spawn(fetch);

    orchestrator.set_view(View::Anime).await.unwrap();
    orchestrator.set_view(View::Manga).await.unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;
    let state = orchestrator.state().await.unwrap();
    assert!(state.is_loading);
    assert_eq!(state.phase, Phase::Loading);
    assert!(state.items.is_empty());

    let state = settled(&orchestrator).await;
    assert_eq!(ids(&state), vec![2]);
    assert_eq!(state.view, View::Manga);
    assert_eq!(state.phase, Phase::Succeeded);
}

#[tokio::test(start_paused = true)]
async fn test_stale_failure_does_not_notify() {
    let fetch = Fetch::mock(HashMap::from([
        (
            url_for(View::Manga, ""),
            after(MockOutcome::failure(FetchError::HttpStatus(500)), 1000),
        ),
        (
            url_for(View::Manhwa, ""),
            vec![MockOutcome::success(vec![item(3)])],
        ),
    ]));
    let (orchestrator, _) = spawn(fetch);

    orchestrator.set_view(View::Manga).await.unwrap();
    orchestrator.set_view(View::Manhwa).await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    let state = orchestrator.state().await.unwrap();
    assert_eq!(ids(&state), vec![3]);
    assert_eq!(state.phase, Phase::Succeeded);
    assert_eq!(state.notification, None);
}

#[tokio::test(start_paused = true)]
async fn test_identical_submissions_are_not_deduplicated() {
    let fetch = Fetch::mock(HashMap::from([(
        url_for(View::Anime, "x"),
        vec![MockOutcome::success(vec![item(9)])],
    )]));
    let (orchestrator, _) = spawn(fetch.clone());

    orchestrator
        .set_search_text(ArcStr::from("x"))
        .await
        .unwrap();
    orchestrator.submit_search().await.unwrap();
    orchestrator.submit_search().await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(
        fetch.requests().await.unwrap(),
        vec![url_for(View::Anime, "x"), url_for(View::Anime, "x")]
    );
    let state = orchestrator.state().await.unwrap();
    assert_eq!(ids(&state), vec![9]);
    assert!(!state.is_loading);
}

#[tokio::test(start_paused = true)]
async fn test_set_search_text_does_not_query() {
    let fetch = Fetch::mock(HashMap::new());
    let (orchestrator, _) = spawn(fetch.clone());

    orchestrator
        .set_search_text(ArcStr::from("naruto"))
        .await
        .unwrap();
    let state = orchestrator.state().await.unwrap();

    assert_eq!(&*state.search_text, "naruto");
    assert!(!state.is_loading);
    assert_eq!(state.phase, Phase::Idle);
    assert!(fetch.requests().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_loading_is_set_while_fetching() {
    let fetch = Fetch::mock(HashMap::from([(
        url_for(View::Manga, ""),
        after(MockOutcome::success(vec![]), 1000),
    )]));
    let (orchestrator, _) = spawn(fetch);

    orchestrator.set_view(View::Manga).await.unwrap();
    let state = orchestrator.state().await.unwrap();
    assert!(state.is_loading);
    assert_eq!(state.phase, Phase::Loading);
    assert_eq!(state.view, View::Manga);

    let state = settled(&orchestrator).await;
    assert!(state.items.is_empty());
    assert_eq!(state.phase, Phase::Succeeded);
}

#[tokio::test(start_paused = true)]
async fn test_notification_is_dismissed_automatically() {
    let fetch = Fetch::mock(HashMap::from([(
        url_for(View::Anime, ""),
        vec![MockOutcome::failure(FetchError::HttpStatus(503))],
    )]));
    let (orchestrator, _) = spawn(fetch);

    orchestrator.set_view(View::Anime).await.unwrap();
    let state = settled(&orchestrator).await;
    assert!(state.notification.is_some());

    let almost = NOTIFICATION - Duration::from_millis(100);
    tokio::time::sleep(almost).await;
    assert!(orchestrator.state().await.unwrap().notification.is_some());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(orchestrator.state().await.unwrap().notification, None);
}

#[tokio::test(start_paused = true)]
async fn test_newer_notification_survives_older_timer() {
    let fetch = Fetch::mock(HashMap::from([(
        url_for(View::Anime, ""),
        vec![MockOutcome::failure(FetchError::RateLimited)],
    )]));
    let (orchestrator, _) = spawn(fetch);

    orchestrator.set_view(View::Anime).await.unwrap();
    let first = settled(&orchestrator).await.notification.unwrap();

    tokio::time::sleep(Duration::from_millis(2000)).await;
    orchestrator.submit_search().await.unwrap();
    let second = settled(&orchestrator).await.notification.unwrap();
    assert!(second.id > first.id);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(
        orchestrator.state().await.unwrap().notification,
        Some(second.clone())
    );

    tokio::time::sleep(Duration::from_millis(1600)).await;
    assert_eq!(orchestrator.state().await.unwrap().notification, None);
}

#[tokio::test(start_paused = true)]
async fn test_reset_returns_to_anime_listing() {
    let fetch = Fetch::mock(HashMap::from([
        (
            url_for(View::Manhwa, "solo"),
            vec![MockOutcome::success(vec![item(4)])],
        ),
        (
            url_for(View::Anime, ""),
            vec![MockOutcome::success(vec![item(5)])],
        ),
    ]));
    let (orchestrator, _) = spawn(fetch.clone());

    orchestrator
        .set_search_text(ArcStr::from("solo"))
        .await
        .unwrap();
    orchestrator.set_view(View::Manhwa).await.unwrap();
    assert_eq!(ids(&settled(&orchestrator).await), vec![4]);

    orchestrator.reset().await.unwrap();
    let state = settled(&orchestrator).await;

    assert_eq!(state.view, View::Anime);
    assert!(state.search_text.is_empty());
    assert_eq!(ids(&state), vec![5]);
    assert_eq!(
        fetch.requests().await.unwrap().last(),
        Some(&url_for(View::Anime, ""))
    );
}

#[tokio::test(start_paused = true)]
async fn test_invalid_base_url_is_a_failure() {
    let fetch = Fetch::mock(HashMap::new());
    let orchestrator = Orchestrator::spawn(
        fetch.clone(),
        Log::mock(),
        ArcStr::from("not a url"),
        NOTIFICATION,
    );

    orchestrator.set_view(View::Anime).await.unwrap();
    let state = settled(&orchestrator).await;

    assert_eq!(state.phase, Phase::Failed);
    assert!(state.notification.is_some());
    assert!(fetch.requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_actor_stops_when_handles_are_dropped() {
    let fetch = Fetch::mock(HashMap::new());
    let core = super::core::Core::new(fetch, Log::mock(), ArcStr::from(BASE), NOTIFICATION);
    let (orchestrator, handle) = core.spawn();

    orchestrator.state().await.unwrap();
    drop(orchestrator);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_from_config_uses_base_url() {
    let mut data = crate::config::Data::default();
    data.set_str(StrOpt::BaseUrl, ArcStr::from(BASE));
    let fetch = Fetch::mock(HashMap::from([(
        url_for(View::Manga, ""),
        vec![MockOutcome::success(vec![item(11)])],
    )]));

    let config = Config::mock(data);
    let orchestrator = Orchestrator::from_config(fetch, Log::mock(), &config).await;
    orchestrator.set_view(View::Manga).await.unwrap();

    assert_eq!(ids(&settled(&orchestrator).await), vec![11]);
}

#[tokio::test]
async fn test_mock_edits_state_without_fetching() {
    let orchestrator = Orchestrator::mock(OrchestratorState::default());
    let mut rx = orchestrator.watch().await.unwrap();

    orchestrator
        .set_search_text(ArcStr::from("bleach"))
        .await
        .unwrap();
    orchestrator.set_view(View::Manga).await.unwrap();
    assert_eq!(orchestrator.launched().await, Some(1));
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().view, View::Manga);

    orchestrator.reset().await.unwrap();
    let state = orchestrator.state().await.unwrap();
    assert_eq!(state.view, View::Anime);
    assert!(state.search_text.is_empty());
    assert_eq!(orchestrator.launched().await, Some(2));
}
