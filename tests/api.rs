//! End-to-end tests against a live server on an ephemeral port, backed by
//! the in-memory store and a stub geocoder.

#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::FixedOffset;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

use meshimap::api::build_app;
use meshimap::app_state::AppState;
use meshimap::domain::{EventBus, GeoPoint};
use meshimap::error::MeshimapError;
use meshimap::geocode::Geocoder;
use meshimap::store::{DocumentStore, MemoryStore};

#[derive(Debug)]
struct StubGeocoder;

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn locate(&self, address: &str) -> Result<Option<GeoPoint>, MeshimapError> {
        if address.contains("nowhere") {
            return Ok(None);
        }
        Ok(Some(GeoPoint {
            latitude: 35.681,
            longitude: 139.767,
        }))
    }
}

/// Boots the app and returns its base address, e.g. `127.0.0.1:54321`.
async fn spawn_app() -> String {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let Some(jst) = FixedOffset::east_opt(9 * 3600) else {
        panic!("valid offset");
    };
    let state = AppState::new(store, Arc::new(StubGeocoder), EventBus::new(64), 10, jst);
    let app = build_app(state, Duration::from_secs(10));

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr.to_string()
}

async fn json_of(resp: reqwest::Response) -> Value {
    let Ok(body) = resp.json::<Value>().await else {
        panic!("response is not JSON");
    };
    body
}

async fn create_shop(client: &reqwest::Client, base: &str, name: &str) -> String {
    let Ok(resp) = client
        .post(format!("http://{base}/api/v1/shops"))
        .json(&json!({
            "name": name,
            "address": "東京都千代田区丸の内1-9-1",
            "genre": "ラーメン",
            "priceRange": "800-1200",
            "station": "東京",
            "businessHours": [{ "label": "", "open": "1100", "close": 1500 }],
        }))
        .send()
        .await
    else {
        panic!("create request failed");
    };
    assert_eq!(resp.status(), 201);
    let body = json_of(resp).await;
    let Some(id) = body["id"].as_str() else {
        panic!("created shop has no id: {body}");
    };
    id.to_string()
}

#[tokio::test]
async fn health_reports_healthy() {
    let base = spawn_app().await;
    let Ok(resp) = reqwest::get(format!("http://{base}/health")).await else {
        panic!("request failed");
    };
    assert_eq!(resp.status(), 200);
    assert_eq!(json_of(resp).await["status"], "healthy");
}

#[tokio::test]
async fn shop_lifecycle_and_filters() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    let id = create_shop(&client, &base, "麺屋A").await;

    let Ok(resp) = client
        .get(format!("http://{base}/api/v1/shops/{id}"))
        .send()
        .await
    else {
        panic!("get failed");
    };
    let shop = json_of(resp).await;
    assert_eq!(shop["name"], "麺屋A");
    assert_eq!(shop["LatLng"]["latitude"], 35.681);
    assert_eq!(shop["businessHours"][0]["open"], 1100);

    let Ok(resp) = client
        .get(format!("http://{base}/api/v1/shops?genre=ラーメン"))
        .send()
        .await
    else {
        panic!("list failed");
    };
    assert_eq!(json_of(resp).await["data"].as_array().map(Vec::len), Some(1));

    let Ok(resp) = client
        .get(format!("http://{base}/api/v1/shops?genre=a&station=b"))
        .send()
        .await
    else {
        panic!("list failed");
    };
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn genre_list_returns_every_match() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    for i in 0..60 {
        create_shop(&client, &base, &format!("麺屋{i:02}")).await;
    }

    let Ok(resp) = client
        .get(format!("http://{base}/api/v1/shops?genre=ラーメン"))
        .send()
        .await
    else {
        panic!("list failed");
    };
    let body = json_of(resp).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(60));
    assert_eq!(body["pagination"]["total"], 60);

    let Ok(resp) = client
        .get(format!("http://{base}/api/v1/shops?genre=ラーメン&per_page=25&page=3"))
        .send()
        .await
    else {
        panic!("list failed");
    };
    assert_eq!(json_of(resp).await["data"].as_array().map(Vec::len), Some(10));
}

#[tokio::test]
async fn unlocatable_address_is_rejected() {
    let base = spawn_app().await;
    let Ok(resp) = reqwest::Client::new()
        .post(format!("http://{base}/api/v1/shops"))
        .json(&json!({ "name": "Ghost", "address": "nowhere 1-1" }))
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(resp.status(), 422);
    assert_eq!(json_of(resp).await["error"]["code"], 1002);
}

#[tokio::test]
async fn toggle_requires_sign_in() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    let id = create_shop(&client, &base, "麺屋B").await;

    let Ok(resp) = client
        .post(format!("http://{base}/api/v1/me/bookmarks/{id}/toggle"))
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(resp.status(), 401);

    let Ok(resp) = client
        .get(format!("http://{base}/api/v1/me/bookmarks/{id}"))
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(json_of(resp).await["present"], false);
}

#[tokio::test]
async fn toggle_flips_and_feeds_the_ranking() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    let id = create_shop(&client, &base, "麺屋C").await;

    let Ok(resp) = client
        .post(format!("http://{base}/api/v1/me/sign-in"))
        .header("x-user-id", "u1")
        .json(&json!({ "displayName": "Hanako", "email": "h@example.com" }))
        .send()
        .await
    else {
        panic!("sign-in failed");
    };
    assert_eq!(json_of(resp).await["created"], true);

    let toggle = format!("http://{base}/api/v1/me/visited/{id}/toggle");
    let Ok(resp) = client.post(&toggle).header("x-user-id", "u1").send().await else {
        panic!("toggle failed");
    };
    assert_eq!(json_of(resp).await["present"], true);

    let Ok(resp) = client
        .get(format!("http://{base}/api/v1/me/visited"))
        .header("x-user-id", "u1")
        .send()
        .await
    else {
        panic!("list failed");
    };
    let marks = json_of(resp).await;
    assert_eq!(marks["data"][0]["name"], "麺屋C");

    let Ok(resp) = client
        .get(format!("http://{base}/api/v1/ranking/monthly"))
        .send()
        .await
    else {
        panic!("ranking failed");
    };
    let ranking = json_of(resp).await;
    assert_eq!(ranking["entries"][0]["display_name"], "Hanako");
    assert_eq!(ranking["entries"][0]["count"], 1);

    let Ok(resp) = client.post(&toggle).header("x-user-id", "u1").send().await else {
        panic!("toggle failed");
    };
    assert_eq!(json_of(resp).await["present"], false);
}

#[tokio::test]
async fn websocket_receives_toggle_events() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    let id = create_shop(&client, &base, "麺屋D").await;

    let Ok((mut ws, _)) = tokio_tungstenite::connect_async(format!("ws://{base}/ws")).await else {
        panic!("ws connect failed");
    };
    let subscribe = json!({
        "id": "1",
        "type": "command",
        "payload": { "command": "subscribe", "shop_ids": [id] },
    });
    let Ok(()) = ws.send(Message::text(subscribe.to_string())).await else {
        panic!("ws send failed");
    };
    let Some(Ok(reply)) = ws.next().await else {
        panic!("no subscribe reply");
    };
    let Ok(reply) = serde_json::from_str::<Value>(reply.to_text().unwrap_or_default()) else {
        panic!("reply is not JSON");
    };
    assert_eq!(reply["type"], "response");

    let Ok(resp) = client
        .post(format!("http://{base}/api/v1/me/bookmarks/{id}/toggle"))
        .header("x-user-id", "u2")
        .send()
        .await
    else {
        panic!("toggle failed");
    };
    assert_eq!(resp.status(), 200);

    let Ok(Some(Ok(event))) = tokio::time::timeout(Duration::from_secs(5), ws.next()).await else {
        panic!("no event received");
    };
    let Ok(event) = serde_json::from_str::<Value>(event.to_text().unwrap_or_default()) else {
        panic!("event is not JSON");
    };
    assert_eq!(event["type"], "event");
    assert_eq!(event["payload"]["event_type"], "mark_toggled");
    assert_eq!(event["payload"]["kind"], "bookmark");
    assert_eq!(event["payload"]["present"], true);
}
