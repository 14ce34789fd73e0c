// SPDX-License-Identifier: Apache-2.0

use dealflow_server::{build_router, AppState};
use dealflow_store::{FakeStore, SqliteStore, SqliteStoreConfig, Store};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

async fn serve(store: Arc<dyn Store>) -> SocketAddr {
    let app = build_router(AppState::new(store));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

async fn serve_sqlite() -> (TempDir, SocketAddr) {
    let dir = tempdir().expect("tempdir");
    let store = SqliteStore::open(SqliteStoreConfig {
        path: dir.path().join("dealflow.sqlite"),
        ..SqliteStoreConfig::default()
    })
    .expect("open store");
    let addr = serve(Arc::new(store)).await;
    (dir, addr)
}

async fn send_raw(
    addr: SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: Option<&str>,
) -> (u16, String, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (k, v) in headers {
        req.push_str(&format!("{k}: {v}\r\n"));
    }
    if let Some(body) = body {
        req.push_str(&format!("Content-Length: {}\r\n\r\n{body}", body.len()));
    } else {
        req.push_str("\r\n");
    }
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    (status, head.to_string(), body.to_string())
}

async fn get_json(addr: SocketAddr, path: &str) -> (u16, Value) {
    let (status, _, body) = send_raw(addr, "GET", path, &[], None).await;
    (status, serde_json::from_str(&body).expect("json body"))
}

async fn post_json(addr: SocketAddr, path: &str, payload: Value) -> (u16, Value) {
    let body = payload.to_string();
    let (status, _, body) = send_raw(
        addr,
        "POST",
        path,
        &[("Content-Type", "application/json")],
        Some(&body),
    )
    .await;
    (status, serde_json::from_str(&body).expect("json body"))
}

async fn seed_requirement(addr: SocketAddr, deal_id: i64, statuses: &[&str]) -> i64 {
    let (status, req) = post_json(
        addr,
        "/requirements/",
        json!({"description": "SSO integration", "deal_id": deal_id}),
    )
    .await;
    assert_eq!(status, 200);
    let req_id = req["id"].as_i64().expect("requirement id");
    for s in statuses {
        let (status, _) = post_json(
            addr,
            "/tickets/",
            json!({"requirement_id": req_id, "status": s, "priority": "High"}),
        )
        .await;
        assert_eq!(status, 200);
    }
    req_id
}

#[tokio::test]
async fn liveness_reports_online_with_request_id() {
    let (_dir, addr) = serve_sqlite().await;
    let (status, head, body) = send_raw(addr, "GET", "/", &[], None).await;
    assert_eq!(status, 200);
    assert!(head.to_ascii_lowercase().contains("x-request-id: req-"));
    assert_eq!(
        serde_json::from_str::<Value>(&body).expect("json"),
        json!({"status": "online"})
    );

    let (_, head, _) = send_raw(addr, "GET", "/", &[("x-request-id", "caller-7")], None).await;
    assert!(head.to_ascii_lowercase().contains("x-request-id: caller-7"));
}

#[tokio::test]
async fn created_deal_appears_in_pipeline_with_all_fields() {
    let (_dir, addr) = serve_sqlite().await;
    let submitted = json!({
        "title": "Data platform",
        "client_name": "Acme",
        "revenue_impact": 250000.5,
        "currency": "EUR",
        "stage": "Legal",
        "probability": 85,
        "forecast_date": "2026-03-31T00:00:00Z"
    });
    let (status, created) = post_json(addr, "/deals/", submitted.clone()).await;
    assert_eq!(status, 200);
    assert_eq!(created["requirements"], json!([]));
    assert!(created["created_at"].is_string());

    let (status, pipeline) = get_json(addr, "/sales/pipeline/").await;
    assert_eq!(status, 200);
    let deals = pipeline.as_array().expect("array");
    assert_eq!(deals.len(), 1);
    let deal = &deals[0];
    for key in ["title", "client_name", "revenue_impact", "currency", "stage", "probability"] {
        assert_eq!(deal[key], submitted[key], "field {key}");
    }
    assert_eq!(deal["forecast_date"], "2026-03-31T00:00:00Z");
    assert_eq!(deal["id"], created["id"]);
}

#[tokio::test]
async fn deal_defaults_are_applied() {
    let (_dir, addr) = serve_sqlite().await;
    let (status, created) = post_json(addr, "/deals/", json!({"title": "Bare"})).await;
    assert_eq!(status, 200);
    assert_eq!(created["currency"], "GBP");
    assert_eq!(created["stage"], "Discovery");
    assert_eq!(created["probability"], 20);
    assert_eq!(created["revenue_impact"], 0.0);
    assert_eq!(created["client_name"], Value::Null);
    assert_eq!(created["forecast_date"], Value::Null);
}

#[tokio::test]
async fn loosely_typed_deal_fields_are_coerced() {
    let (_dir, addr) = serve_sqlite().await;
    for raw in ["2026-03-31", "2026-03-31T00:00:00"] {
        let (status, created) = post_json(
            addr,
            "/deals/",
            json!({"title": "Rollout", "probability": 90.0, "forecast_date": raw}),
        )
        .await;
        assert_eq!(status, 200, "{raw}: {created}");
        assert_eq!(created["forecast_date"], "2026-03-31T00:00:00Z");
        assert_eq!(created["probability"], 90);
    }

    let (status, body) = post_json(
        addr,
        "/deals/",
        json!({"title": "Rollout", "forecast_date": "next quarter"}),
    )
    .await;
    assert_eq!(status, 422);
    assert_eq!(body["error"]["code"], "ValidationFailed");
}

#[tokio::test]
async fn pipeline_is_ordered_by_revenue_and_nests_requirements() {
    let (_dir, addr) = serve_sqlite().await;
    for (title, revenue) in [("small", 1000.0), ("large", 90000.0), ("medium", 5000.0)] {
        post_json(addr, "/deals/", json!({"title": title, "revenue_impact": revenue})).await;
    }
    let (_, pipeline) = get_json(addr, "/sales/pipeline/").await;
    let titles: Vec<&str> = pipeline
        .as_array()
        .expect("array")
        .iter()
        .map(|d| d["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, ["large", "medium", "small"]);

    let large_id = pipeline[0]["id"].as_i64().expect("id");
    seed_requirement(addr, large_id, &["closed", "open"]).await;
    let (_, pipeline) = get_json(addr, "/sales/pipeline/").await;
    let reqs = pipeline[0]["requirements"].as_array().expect("requirements");
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0]["description"], "SSO integration");
    assert_eq!(reqs[0]["confidence_score"], 50);
}

#[tokio::test]
async fn ribbon_flags_high_probability_deal_with_no_closed_tickets() {
    let (_dir, addr) = serve_sqlite().await;
    let (_, deal) = post_json(
        addr,
        "/deals/",
        json!({"title": "Rollout", "probability": 90, "revenue_impact": 1234567.5, "stage": "POC"}),
    )
    .await;
    let deal_id = deal["id"].as_i64().expect("deal id");
    seed_requirement(addr, deal_id, &["Open", "In Progress"]).await;

    let (status, ribbon) = get_json(addr, &format!("/deals/{deal_id}/ribbon")).await;
    assert_eq!(status, 200);
    assert_eq!(
        ribbon,
        json!({
            "ribbon": {
                "business_value": "GBP 1,234,567.50",
                "status_label": "Stage: POC (90% Probability)",
                "alignment_score": "0% Tech-Ready",
                "at_risk": true
            },
            "message": "Engineering progress is trailing sales probability."
        })
    );
}

#[tokio::test]
async fn ribbon_is_aligned_when_three_of_four_tickets_closed() {
    let (_dir, addr) = serve_sqlite().await;
    let payload = json!({"title": "Rollout", "probability": 90});
    let (_, deal) = post_json(addr, "/deals/", payload).await;
    let deal_id = deal["id"].as_i64().expect("deal id");
    seed_requirement(addr, deal_id, &["Closed", "Closed", "Closed", "Open"]).await;

    let (_, ribbon) = get_json(addr, &format!("/deals/{deal_id}/ribbon")).await;
    assert_eq!(ribbon["ribbon"]["alignment_score"], "75% Tech-Ready");
    assert_eq!(ribbon["ribbon"]["at_risk"], false);
    assert_eq!(ribbon["message"], "Aligned");
}

#[tokio::test]
async fn ribbon_is_aligned_for_low_probability_deal() {
    let (_dir, addr) = serve_sqlite().await;
    let (_, deal) = post_json(addr, "/deals/", json!({"title": "Early", "probability": 50})).await;
    let deal_id = deal["id"].as_i64().expect("deal id");
    seed_requirement(addr, deal_id, &["Open"]).await;

    let (_, ribbon) = get_json(addr, &format!("/deals/{deal_id}/ribbon")).await;
    assert_eq!(ribbon["ribbon"]["at_risk"], false);
    assert_eq!(ribbon["message"], "Aligned");
}

#[tokio::test]
async fn ribbon_for_unknown_deal_is_not_found() {
    let (_dir, addr) = serve_sqlite().await;
    let (status, body) = get_json(addr, "/deals/999/ribbon").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NotFound");
    assert_eq!(body["error"]["message"], "Deal not found");
    assert_eq!(body["error"]["details"]["deal_id"], 999);
}

#[tokio::test]
async fn non_numeric_deal_id_is_rejected_in_error_envelope() {
    let (_dir, addr) = serve_sqlite().await;
    let (status, body) = get_json(addr, "/deals/abc/ribbon").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "ValidationFailed");
    assert!(body["error"]["details"]["field_errors"][0]["reason"].is_string());
}

#[tokio::test]
async fn requirement_for_unknown_deal_is_created() {
    let (_dir, addr) = serve_sqlite().await;
    let (status, req) = post_json(
        addr,
        "/requirements/",
        json!({"description": "Orphan", "deal_id": 77}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(req["deal_id"], 77);
    assert_eq!(req["confidence_score"], 0);
}

#[tokio::test]
async fn malformed_bodies_are_rejected_with_field_errors() {
    let (_dir, addr) = serve_sqlite().await;

    let (status, body) = post_json(addr, "/deals/", json!({"client_name": "no title"})).await;
    assert_eq!(status, 422);
    assert_eq!(body["error"]["code"], "ValidationFailed");
    let reason = body["error"]["details"]["field_errors"][0]["reason"]
        .as_str()
        .expect("reason");
    assert!(reason.contains("title"), "{reason}");

    let (status, body) = post_json(
        addr,
        "/deals/",
        json!({"title": "x", "stage": "Negotiation"}),
    )
    .await;
    assert_eq!(status, 422);
    assert_eq!(body["error"]["code"], "ValidationFailed");

    let (status, _) = post_json(
        addr,
        "/requirements/",
        json!({"description": "x", "deal_id": "one"}),
    )
    .await;
    assert_eq!(status, 422);

    let (status, _, _) = send_raw(
        addr,
        "POST",
        "/tickets/",
        &[("Content-Type", "application/json")],
        Some("{not json"),
    )
    .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn unreachable_store_is_503_and_sessions_are_released() {
    let store = Arc::new(FakeStore::default());
    let addr = serve(store.clone()).await;

    let (status, _) = post_json(addr, "/deals/", json!({"title": "Rollout"})).await;
    assert_eq!(status, 200);

    store.fail_reads.store(true, Ordering::SeqCst);
    let (status, body) = get_json(addr, "/sales/pipeline/").await;
    assert_eq!(status, 500);
    assert_eq!(body["error"]["code"], "Internal");
    store.fail_reads.store(false, Ordering::SeqCst);

    store.unavailable.store(true, Ordering::SeqCst);
    let (status, body) = get_json(addr, "/deals/1/ribbon").await;
    assert_eq!(status, 503);
    assert_eq!(body["error"]["code"], "StoreUnavailable");

    assert_eq!(store.sessions_opened.load(Ordering::SeqCst), 2);
    assert_eq!(store.sessions_open(), 0);
}
