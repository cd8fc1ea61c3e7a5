use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use babyfoot_back::{
    dao::league_store::memory::InMemoryLeagueStore,
    routes,
    state::{AppState, SharedState},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    routes::router(AppState::with_store(Arc::new(InMemoryLeagueStore::new()), 16))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

#[tokio::test]
async fn match_lifecycle_over_http() {
    let app = app();

    let (status, created) = send(
        &app,
        "POST",
        "/api/matches",
        Some(json!({"player1": "A", "player2": "B"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["status"], "IN_PROGRESS");
    assert!(created["winner"].is_null());
    let id = created["id"].as_str().unwrap().to_owned();

    let (status, active) = send(&app, "GET", "/api/matches/active", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(active.as_array().unwrap().len(), 1);

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/matches/{id}/score"),
        Some(json!({"score1": 5, "score2": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!((updated["score1"].clone(), updated["score2"].clone()), (json!(5), json!(3)));

    let (status, finished) = send(&app, "PUT", &format!("/api/matches/{id}/finish"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finished["status"], "FINISHED");
    assert_eq!(finished["winner"], "A");
    assert!(finished["finishedAt"].is_string());

    let (status, _) = send(&app, "PUT", &format!("/api/matches/{id}/finish"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, a) = send(&app, "GET", "/api/players/name/A", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(a["wins"], 1);
    assert_eq!(a["goalsScored"], 5);
    assert_eq!(a["goalsConceded"], 3);
    assert_eq!(a["winRate"], 1.0);

    let (status, by_player) = send(&app, "GET", "/api/matches/player/B", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_player.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "DELETE", &format!("/api/matches/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());

    let (status, _) = send(&app, "GET", &format!("/api/matches/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_match_ids_map_to_not_found() {
    let app = app();
    let missing = "00000000-0000-4000-8000-000000000000";

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/matches/{missing}/score"),
        Some(json!({"score1": 1, "score2": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains(missing));

    let (status, _) = send(&app, "PUT", &format!("/api/matches/{missing}/cancel"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &format!("/api/matches/{missing}"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn player_registry_over_http() {
    let app = app();

    let (status, alice) = send(&app, "POST", "/api/players", Some(json!({"name": "alice"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alice["wins"], 0);
    assert_eq!(alice["winRate"], 0.0);
    let id = alice["id"].as_str().unwrap().to_owned();

    let (status, _) = send(&app, "POST", "/api/players", Some(json!({"name": "alice"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "POST", "/api/players", Some(json!({"name": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/players/{id}"),
        Some(json!({"name": "alicia", "wins": 2, "losses": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "alicia");
    assert_eq!(updated["winRate"], 0.5);
    assert_eq!(updated["goalsScored"], 0);

    let (status, _) = send(&app, "GET", "/api/players/name/alice", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, listed) = send(&app, "GET", "/api/players", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/api/players/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", &format!("/api/players/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn degraded_backend_answers_service_unavailable() {
    let state: SharedState = AppState::new(4);
    let app = routes::router(state);

    let (status, health) = send(&app, "GET", "/healthcheck", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "degraded");

    let (status, _) = send(&app, "GET", "/api/matches", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app();
    let (status, doc) = send(&app, "GET", "/api-doc/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/matches/{id}/finish"].is_object());
}
