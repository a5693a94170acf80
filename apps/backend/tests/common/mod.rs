//! Common test utilities for integration tests.
//!
//! Every context runs against its own in-memory SQLite database, so tests
//! need no external services and never share state.

pub mod fixtures;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use uuid::Uuid;

use repertoire_backend::db::Database;
use repertoire_backend::models::{AttemptRecord, Line, Opening};
use repertoire_backend::routes::identity::USER_ID_HEADER;
use repertoire_backend::services::catalog;
use repertoire_backend::{build_router, AppState};

/// Test context holding a fresh database and the application router.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl TestContext {
    /// Create a new test context with migrations applied.
    pub async fn new() -> Self {
        let db = Database::connect_in_memory()
            .await
            .expect("Failed to open in-memory database");

        db.run_migrations().await.expect("Failed to run migrations");

        let state = AppState::new(db);
        let db = state.db.clone();
        let app = build_router(state);

        Self { db, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Seed the built-in catalogue and return it in catalogue order.
    pub async fn seed_openings(&self) -> Vec<Opening> {
        catalog::seed_builtin(&self.db)
            .await
            .expect("Failed to seed openings");
        self.openings().await
    }

    pub async fn openings(&self) -> Vec<Opening> {
        self.db
            .list_openings()
            .await
            .expect("Failed to list openings")
            .iter()
            .map(|row| row.to_core().expect("Invalid opening row"))
            .collect()
    }

    /// Add a variation line to an opening.
    pub async fn add_line(&self, opening_id: Uuid, name: &str, moves: &[&str]) -> Line {
        let moves: Vec<String> = moves.iter().map(|m| m.to_string()).collect();
        self.db
            .insert_line(opening_id, name, &moves)
            .await
            .expect("Failed to insert line")
    }

    /// Recorded attempts for a user, oldest first.
    pub async fn attempts(&self, user_id: Uuid) -> Vec<AttemptRecord> {
        self.db
            .attempts_for_user(user_id)
            .await
            .expect("Failed to load attempts")
            .iter()
            .map(|row| row.to_core().expect("Invalid attempt row"))
            .collect()
    }

    /// Identity header for a user.
    pub fn user_header(user_id: Uuid) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static(USER_ID_HEADER),
            HeaderValue::from_str(&user_id.to_string()).expect("Invalid header value"),
        )
    }
}
