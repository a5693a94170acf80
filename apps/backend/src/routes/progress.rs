//! Progress endpoints

use axum::{extract::State, Extension, Json};
use chrono::Utc;

use crate::error::Result;
use crate::models::*;
use crate::routes::identity::CurrentUser;
use crate::services::practice;
use crate::AppState;

/// POST /api/progress/toggle
/// Activates an opening's main line or a variation, or flips it on and off
pub async fn toggle(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ToggleActiveRequest>,
) -> Result<Json<ProgressView>> {
    let item = TrackableItem {
        user_id: user.user_id,
        opening_id: payload.opening_id,
        line: LineRef::from_line_id(payload.line_id),
    };

    let progress = practice::toggle_active(&state.db, &state.scheduler, item, Utc::now()).await?;
    Ok(Json(progress))
}
