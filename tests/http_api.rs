//! REST API tests against a live server.

#![allow(clippy::panic, clippy::indexing_slicing)]

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tokio_test::assert_ok;
use tower::ServiceExt;

use common::{room_id, spawn_server};
use planning_poker::domain::Point;

async fn get_json(url: &str) -> (reqwest::StatusCode, Value) {
    let Ok(resp) = reqwest::get(url).await else {
        panic!("GET {url} failed");
    };
    let status = resp.status();
    let Ok(body) = resp.json::<Value>().await else {
        panic!("GET {url} returned no JSON");
    };
    (status, body)
}

async fn post_json(url: &str) -> (reqwest::StatusCode, Value) {
    let Ok(resp) = reqwest::Client::new().post(url).send().await else {
        panic!("POST {url} failed");
    };
    let status = resp.status();
    let Ok(body) = resp.json::<Value>().await else {
        panic!("POST {url} returned no JSON");
    };
    (status, body)
}

#[tokio::test]
async fn health_without_network() {
    let server = spawn_server().await;
    let app = planning_poker::build_app(
        planning_poker::app_state::AppState::new(std::sync::Arc::clone(&server.service)),
        None,
    );
    let request = assert_ok!(Request::builder().uri("/health").body(Body::empty()));
    let response = assert_ok!(app.oneshot(request).await);
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_reports_version() {
    let server = spawn_server().await;
    let (status, body) = get_json(&server.http("/health")).await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn deck_lists_cards_in_order() {
    let server = spawn_server().await;
    let (status, body) = get_json(&server.http("/config/deck")).await;
    assert_eq!(status, reqwest::StatusCode::OK);

    let Some(cards) = body.as_array() else {
        panic!("deck is an array");
    };
    let labels: Vec<&str> = cards.iter().filter_map(|c| c["label"].as_str()).collect();
    assert_eq!(
        labels,
        vec!["1", "2", "3", "5", "8", "13", "21", "34", "55", "89", "?", "∞"]
    );
    assert_eq!(cards[0]["value"], 1);
    assert!(cards[11].get("value").is_none());
}

#[tokio::test]
async fn unknown_room_is_not_found() {
    let server = spawn_server().await;
    let (status, body) = get_json(&server.http("/api/v1/rooms/ghost")).await;
    assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 2002);

    let (status, _) = post_json(&server.http("/api/v1/rooms/ghost/reveal")).await;
    assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
    let (status, _) = post_json(&server.http("/api/v1/rooms/ghost/reset")).await;
    assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_room_id_is_rejected() {
    let server = spawn_server().await;
    let long = "x".repeat(200);
    let (status, body) = get_json(&server.http(&format!("/api/v1/rooms/{long}"))).await;
    assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1001);
}

#[tokio::test]
async fn cards_stay_hidden_until_reveal() {
    let server = spawn_server().await;
    let id = room_id("sprint-42");
    assert_ok!(server.service.join(&id, "alice").await);
    assert_ok!(server.service.join(&id, "bob").await);
    assert_ok!(server.service.set_estimate(&id, "alice", Point::numeric(3)).await);

    let (status, body) = get_json(&server.http("/api/v1/rooms/sprint-42")).await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body["state"], "open");
    assert_eq!(body["participants"][0]["user_name"], "alice");
    assert_eq!(body["participants"][0]["is_estimated"], true);
    assert_eq!(body["participants"][1]["is_estimated"], false);
    assert!(body.get("estimates").is_none());

    let (status, body) = post_json(&server.http("/api/v1/rooms/sprint-42/reveal")).await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body["state"], "estimated");
    assert_eq!(body["estimates"][0]["point"], "3");
    assert_eq!(body["estimates"][1]["point"], "");
    assert!(body["revealed_at"].is_string());

    let (status, body) = post_json(&server.http("/api/v1/rooms/sprint-42/reset")).await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body["state"], "estimated");
    assert_eq!(body["estimates"][0]["point"], "");
}

#[tokio::test]
async fn storage_outage_is_service_unavailable() {
    let server = spawn_server().await;
    let id = room_id("flaky");
    assert_ok!(server.service.join(&id, "alice").await);

    server.store.set_fail_stores(true);
    let (status, body) = post_json(&server.http("/api/v1/rooms/flaky/reveal")).await;
    assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], 3001);

    let (_, body) = get_json(&server.http("/api/v1/rooms/flaky")).await;
    assert_eq!(body["state"], "open");
}
