//! Opening catalogue endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::routes::identity::CurrentUser;
use crate::services::catalog;
use crate::AppState;

/// GET /api/openings
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<OpeningOverview>>> {
    let openings = catalog::overview(&state.db, user.user_id).await?;
    Ok(Json(openings))
}

/// GET /api/openings/{opening_id}
pub async fn get_one(
    State(state): State<AppState>,
    Path(opening_id): Path<Uuid>,
) -> Result<Json<OpeningDetail>> {
    let detail = catalog::detail(&state.db, opening_id).await?;
    Ok(Json(detail))
}

/// POST /api/openings/seed
pub async fn seed(State(state): State<AppState>) -> Result<Json<SeedResponse>> {
    let inserted = catalog::seed_builtin(&state.db).await?;
    Ok(Json(SeedResponse { inserted }))
}
