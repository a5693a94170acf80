//! Practice endpoints

use axum::{extract::State, Extension, Json};
use chrono::Utc;

use crate::error::Result;
use crate::models::*;
use crate::routes::identity::CurrentUser;
use crate::services::practice;
use crate::AppState;

/// GET /api/practice/next
/// Returns `null` when nothing is due
pub async fn next(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Option<NextPracticeResponse>>> {
    let next = practice::next_due(&state.db, user.user_id, Utc::now()).await?;
    Ok(Json(next))
}

/// POST /api/practice/submit
pub async fn submit(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<SubmitPracticeRequest>,
) -> Result<Json<SubmitPracticeResponse>> {
    let progress = practice::submit(
        &state.db,
        &state.scheduler,
        user.user_id,
        &payload,
        Utc::now(),
    )
    .await?;

    Ok(Json(SubmitPracticeResponse { progress }))
}

/// GET /api/practice/stats
pub async fn stats(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<PracticeStats>> {
    let stats = practice::stats(&state.db, user.user_id, Utc::now()).await?;
    Ok(Json(stats))
}
