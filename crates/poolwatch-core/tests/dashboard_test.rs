#![allow(clippy::unwrap_used)]
// Dashboard store tests against a mock backend.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use poolwatch_api::ApiClient;
use poolwatch_core::{DashboardOp, DashboardStore, PoolId, TimeRange};

async fn setup() -> (MockServer, DashboardStore) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    (server, DashboardStore::new(client))
}

fn ok_envelope(data: serde_json::Value) -> serde_json::Value {
    json!({ "code": 200, "message": "ok", "data": data })
}

fn pool_json(id: u64, name: &str) -> serde_json::Value {
    json!({ "id": id, "name": name, "status": "healthy", "enabled": true })
}

fn status_json(pool_id: u64, valid: i64) -> serde_json::Value {
    json!({
        "poolId": pool_id,
        "validCount": valid,
        "invalidCount": 1,
        "coolingCount": 0,
        "totalCount": valid + 1,
        "recordTime": 1_717_000_000_000_i64
    })
}

async fn mount_public_pools(server: &MockServer, pools: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/pools/public"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(pools)))
        .mount(server)
        .await;
}

async fn mount_all_statuses(server: &MockServer, statuses: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/pool-status/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(statuses)))
        .mount(server)
        .await;
}

// ── Public pool join ────────────────────────────────────────────────

#[tokio::test]
async fn public_fetch_joins_statuses_and_auto_selects_first() {
    let (server, store) = setup().await;
    mount_public_pools(&server, json!([pool_json(1, "a"), pool_json(2, "b")])).await;
    mount_all_statuses(&server, json!([status_json(1, 10)])).await;

    store.fetch_public_pools().await.unwrap();

    let pools = store.pools();
    assert_eq!(pools.len(), 2);
    assert_eq!(pools[0].status.as_ref().unwrap().valid_count, 10);
    assert!(pools[1].status.is_none());

    assert_eq!(store.selected().unwrap(), PoolId::new("1"));
    assert_eq!(store.selected_status().unwrap().valid_count, 10);
}

#[tokio::test]
async fn public_fetch_failure_blanks_the_list() {
    let (server, store) = setup().await;
    mount_public_pools(&server, json!([pool_json(1, "a")])).await;
    mount_all_statuses(&server, json!([])).await;
    store.fetch_public_pools().await.unwrap();
    assert_eq!(store.pools().len(), 1);

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/pools/public"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_all_statuses(&server, json!([])).await;

    let err = store.fetch_public_pools().await.unwrap_err();
    assert_eq!(err.code_str(), "INTERNAL_ERROR");
    assert!(store.pools().is_empty());
    assert!(store.error(DashboardOp::Pools).is_some());
}

// ── Overview ────────────────────────────────────────────────────────

#[tokio::test]
async fn overview_fetch_publishes_totals_and_blanks_on_failure() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/pool-status/overview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!({
            "totalPools": 4,
            "activePools": 3,
            "totalValidCount": 100,
            "avgPressure": 61.5
        }))))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    store.fetch_overview_stats().await.unwrap();
    let overview = store.overview().unwrap();
    assert_eq!(overview.total_pools, 4);
    assert_eq!(overview.avg_pressure, Some(61.5));

    Mock::given(method("GET"))
        .and(path("/api/pool-status/overview"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    store.fetch_overview_stats().await.unwrap_err();
    assert!(store.overview().is_none());
    assert!(store.error(DashboardOp::Overview).is_some());
}

// ── Selection ───────────────────────────────────────────────────────

#[tokio::test]
async fn selecting_the_same_pool_twice_fetches_once() {
    let (server, store) = setup().await;
    let id = PoolId::new("5");

    Mock::given(method("GET"))
        .and(path("/api/pool-status/trend/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!([
            status_json(5, 1), status_json(5, 2)
        ]))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/pool-status/latest/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(status_json(5, 2))))
        .expect(1)
        .mount(&server)
        .await;

    store.set_selected_pool(Some(id.clone())).await;
    store.set_selected_pool(Some(id.clone())).await;

    assert_eq!(store.selected().unwrap(), id);
    assert!(store.chart_data(&id, TimeRange::Day1).is_some());
    assert_eq!(store.selected_status().unwrap().valid_count, 2);
    // Mock expectations (one call each) are verified on drop.
}

#[tokio::test]
async fn switching_pools_keeps_other_chart_entries() {
    let (server, store) = setup().await;

    for id in [5u64, 6] {
        Mock::given(method("GET"))
            .and(path(format!("/api/pool-status/trend/{id}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(ok_envelope(json!([status_json(id, 1)]))),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/api/pool-status/latest/{id}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(ok_envelope(status_json(id, 1))),
            )
            .mount(&server)
            .await;
    }

    store.set_selected_pool(Some(PoolId::new("5"))).await;
    store.set_selected_pool(Some(PoolId::new("6"))).await;

    assert!(store.chart_data(&PoolId::new("5"), TimeRange::Day1).is_some());
    assert!(store.chart_data(&PoolId::new("6"), TimeRange::Day1).is_some());
    assert_eq!(
        store.current_chart_data(TimeRange::Day1).unwrap(),
        store.chart_data(&PoolId::new("6"), TimeRange::Day1).unwrap()
    );
}

#[tokio::test]
async fn clearing_the_selection_drops_charts_and_status() {
    let (server, store) = setup().await;
    let id = PoolId::new("5");

    Mock::given(method("GET"))
        .and(path("/api/pool-status/trend/5"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(ok_envelope(json!([status_json(5, 1)]))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/pool-status/latest/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(status_json(5, 1))))
        .mount(&server)
        .await;

    store.set_selected_pool(Some(id.clone())).await;
    assert!(store.chart_data(&id, TimeRange::Day1).is_some());

    store.set_selected_pool(None).await;
    assert!(store.selected().is_none());
    assert!(store.selected_status().is_none());
    assert!(store.chart_data(&id, TimeRange::Day1).is_none());
}

#[tokio::test]
async fn failed_history_fetch_blanks_the_chart_slot() {
    let (server, store) = setup().await;
    let id = PoolId::new("5");

    Mock::given(method("GET"))
        .and(path("/api/pool-status/trend/5"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(ok_envelope(json!([status_json(5, 1)]))),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    store.fetch_pool_history(&id, TimeRange::Week7).await.unwrap();
    assert!(store.chart_data(&id, TimeRange::Week7).is_some());

    Mock::given(method("GET"))
        .and(path("/api/pool-status/trend/5"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    store
        .fetch_pool_history(&id, TimeRange::Week7)
        .await
        .unwrap_err();
    assert!(store.chart_data(&id, TimeRange::Week7).is_none());
    assert!(store.error(DashboardOp::History).is_some());
}

#[tokio::test]
async fn history_and_status_loading_flags_are_independent() {
    let (server, store) = setup().await;
    let id = PoolId::new("9");

    Mock::given(method("GET"))
        .and(path("/api/pool-status/trend/9"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok_envelope(json!([])))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/pool-status/latest/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(status_json(9, 3))))
        .mount(&server)
        .await;

    let history = tokio::spawn({
        let store = store.clone();
        let id = id.clone();
        async move { store.fetch_pool_history(&id, TimeRange::Day1).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(store.is_op_loading(DashboardOp::History));

    // The fast status fetch must not flip the history flag.
    store.fetch_latest_pool_status(&id).await.unwrap();
    assert!(!store.is_op_loading(DashboardOp::Status));
    assert!(store.is_op_loading(DashboardOp::History));

    history.await.unwrap().unwrap();
    assert!(!store.is_op_loading(DashboardOp::History));
}

// ── Auto refresh ────────────────────────────────────────────────────

#[tokio::test]
async fn auto_refresh_polls_and_stop_halts_all_requests() {
    let (server, store) = setup().await;
    mount_public_pools(&server, json!([])).await;
    mount_all_statuses(&server, json!([])).await;
    Mock::given(method("GET"))
        .and(path("/api/pool-status/overview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!({
            "totalPools": 0
        }))))
        .mount(&server)
        .await;

    store.start_auto_refresh(Duration::from_millis(50)).await;
    tokio::time::sleep(Duration::from_millis(140)).await;
    store.stop_auto_refresh().await;

    let after_stop = server.received_requests().await.unwrap().len();
    assert!(after_stop > 0, "the task should have polled at least once");

    tokio::time::sleep(Duration::from_millis(150)).await;
    let later = server.received_requests().await.unwrap().len();
    assert_eq!(after_stop, later, "no requests after stop_auto_refresh");
}

#[tokio::test]
async fn auto_refresh_skips_an_immediate_first_tick() {
    let (server, store) = setup().await;
    mount_public_pools(&server, json!([])).await;
    mount_all_statuses(&server, json!([])).await;

    store.start_auto_refresh(Duration::from_secs(60)).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    store.stop_auto_refresh().await;

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn stop_auto_refresh_is_safe_without_a_task() {
    let (_server, store) = setup().await;
    store.stop_auto_refresh().await;
    store.stop_auto_refresh().await;
}
