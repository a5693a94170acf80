//! Opening catalogue API tests.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use pretty_assertions::assert_eq;
use repertoire_backend::models::{Difficulty, Opening, Side};
use uuid::Uuid;

use common::TestContext;

/// Health check needs no identity.
#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("OK");
}

/// API routes reject requests without a user id.
#[tokio::test]
async fn test_missing_user_header() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server.get("/api/openings").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "unauthorized");
}

/// A user id that is not a UUID is rejected.
#[tokio::test]
async fn test_malformed_user_header() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .get("/api/practice/stats")
        .add_header("x-user-id", "not-a-uuid")
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

/// Seeding inserts the built-in set once.
#[tokio::test]
async fn test_seed_is_idempotent() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (name, value) = TestContext::user_header(Uuid::new_v4());

    let first = server
        .post("/api/openings/seed")
        .add_header(name.clone(), value.clone())
        .await;
    first.assert_status_ok();
    let body: serde_json::Value = first.json();
    assert_eq!(body["inserted"], 8);

    let second = server
        .post("/api/openings/seed")
        .add_header(name, value)
        .await;
    second.assert_status_ok();
    let body: serde_json::Value = second.json();
    assert_eq!(body["inserted"], 0);

    assert_eq!(ctx.openings().await.len(), 8);
}

/// Listing shows every opening with no progress for a new user.
#[tokio::test]
async fn test_list_openings_for_new_user() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let openings = ctx.seed_openings().await;
    let (name, value) = TestContext::user_header(Uuid::new_v4());

    let response = server.get("/api/openings").add_header(name, value).await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), openings.len());

    let first = &listed[0];
    assert_eq!(first["name"], "Italian Game");
    assert_eq!(first["eco"], "C50");
    assert_eq!(first["side"], "white");
    assert_eq!(first["is_active"], false);
    assert_eq!(first["current_move_index"], 0);
    assert_eq!(first["total_moves"], 10);
    assert_eq!(first["is_user_created"], false);
    assert!(first["next_review_date"].is_null());
}

/// Listing reflects the caller's activated items and lines.
#[tokio::test]
async fn test_list_openings_shows_progress() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let openings = ctx.seed_openings().await;
    let opening = &openings[1];
    let line = ctx
        .add_line(opening.id, "English Attack", &["e4", "c5", "Nf3", "d6", "Be3"])
        .await;
    let (name, value) = TestContext::user_header(Uuid::new_v4());

    server
        .post("/api/progress/toggle")
        .add_header(name.clone(), value.clone())
        .json(&common::fixtures::toggle_main_line(opening.id))
        .await
        .assert_status_ok();

    let response = server.get("/api/openings").add_header(name, value).await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let listed = &body.as_array().unwrap()[1];
    assert_eq!(listed["id"], opening.id.to_string());
    assert_eq!(listed["is_active"], true);
    assert!(listed["next_review_date"].is_i64());

    let lines = listed["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["id"], line.id.to_string());
    assert_eq!(lines[0]["is_active"], false);
    assert_eq!(lines[0]["total_moves"], 5);
}

/// Progress from one user is invisible to another.
#[tokio::test]
async fn test_list_openings_is_per_user() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let openings = ctx.seed_openings().await;
    let (alice, alice_id) = TestContext::user_header(Uuid::new_v4());
    let (bob, bob_id) = TestContext::user_header(Uuid::new_v4());

    server
        .post("/api/progress/toggle")
        .add_header(alice, alice_id)
        .json(&common::fixtures::toggle_main_line(openings[0].id))
        .await
        .assert_status_ok();

    let response = server.get("/api/openings").add_header(bob, bob_id).await;

    let body: serde_json::Value = response.json();
    assert_eq!(body[0]["is_active"], false);
}

/// Only the owner sees an opening as user-created.
#[tokio::test]
async fn test_list_marks_owned_openings() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let owner_id = Uuid::new_v4();
    let opening = Opening {
        id: Uuid::new_v4(),
        name: "Owner's Gambit".to_string(),
        eco: "A00".to_string(),
        moves: vec!["g4".to_string(), "d5".to_string()],
        side: Side::White,
        description: "Private prep.".to_string(),
        difficulty: Difficulty::Advanced,
        owner_id: Some(owner_id),
    };
    ctx.db.insert_opening(&opening).await.unwrap();

    let (name, value) = TestContext::user_header(owner_id);
    let body: serde_json::Value = server
        .get("/api/openings")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(body[0]["is_user_created"], true);
    assert_eq!(body[0]["owner_id"], owner_id.to_string());

    let (name, value) = TestContext::user_header(Uuid::new_v4());
    let body: serde_json::Value = server
        .get("/api/openings")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(body[0]["is_user_created"], false);
}

/// Detail returns the opening with its lines in order.
#[tokio::test]
async fn test_get_opening_detail() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let openings = ctx.seed_openings().await;
    let opening = &openings[0];
    ctx.add_line(opening.id, "Evans Gambit", &["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "b4"])
        .await;
    ctx.add_line(opening.id, "Two Knights", &["e4", "e5", "Nf3", "Nc6", "Bc4", "Nf6"])
        .await;
    let (name, value) = TestContext::user_header(Uuid::new_v4());

    let response = server
        .get(&format!("/api/openings/{}", opening.id))
        .add_header(name, value)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["name"], "Italian Game");
    assert_eq!(body["moves"].as_array().unwrap().len(), 10);

    let lines = body["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["name"], "Evans Gambit");
    assert_eq!(lines[0]["order"], 1);
    assert_eq!(lines[1]["name"], "Two Knights");
    assert_eq!(lines[1]["order"], 2);
}

/// Detail of an unknown opening is a 404.
#[tokio::test]
async fn test_get_unknown_opening() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (name, value) = TestContext::user_header(Uuid::new_v4());

    let response = server
        .get(&format!("/api/openings/{}", Uuid::new_v4()))
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}
