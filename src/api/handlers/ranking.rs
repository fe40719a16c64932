//! Monthly visit ranking.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::RankingResponse;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, MeshimapError};

/// `GET /ranking/monthly`: Users ranked by visits this calendar month.
///
/// A failed scan yields an empty list rather than an error.
///
/// # Errors
///
/// Returns [`MeshimapError::Internal`] only if the month window itself
/// cannot be built.
#[utoipa::path(
    get,
    path = "/api/v1/ranking/monthly",
    tag = "Ranking",
    summary = "Monthly visit ranking",
    description = "Ranks users by the number of shops marked visited in the current calendar month.",
    responses(
        (status = 200, description = "Ranking", body = RankingResponse),
        (status = 500, description = "Month window could not be built", body = ErrorResponse),
    )
)]
pub async fn monthly_ranking(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, MeshimapError> {
    let now = Utc::now();
    let window = state.ranking_service.window_at(now)?;
    let entries = state.ranking_service.monthly_ranking_at(now).await;
    Ok(Json(RankingResponse { window, entries }))
}

/// Ranking routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/ranking/monthly", get(monthly_ranking))
}
