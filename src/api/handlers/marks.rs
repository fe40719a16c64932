//! Bookmark / visited handlers for the signed-in user.
//!
//! `{kind}` is `bookmarks` or `visited`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::auth::CurrentUser;
use crate::api::dto::{MarkListResponse, MarkStateResponse};
use crate::app_state::AppState;
use crate::domain::{MarkKind, ShopId};
use crate::error::{ErrorResponse, MeshimapError};

/// `GET /me/{kind}`: List the user's bookmarks or visits.
///
/// # Errors
///
/// Returns [`MeshimapError::InvalidRequest`] for an unknown kind.
#[utoipa::path(
    get,
    path = "/api/v1/me/{kind}",
    tag = "Marks",
    summary = "List marks",
    description = "Lists the signed-in user's bookmarks or visits. Anonymous callers get an empty list.",
    params(
        ("kind" = String, Path, description = "`bookmarks` or `visited`"),
        ("x-user-id" = Option<String>, Header, description = "Signed-in user"),
    ),
    responses(
        (status = 200, description = "Marks", body = MarkListResponse),
        (status = 400, description = "Unknown kind", body = ErrorResponse),
    )
)]
pub async fn list_marks(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, MeshimapError> {
    let kind: MarkKind = kind.parse()?;
    let data = state
        .mark_service
        .list(kind, &user.or_anonymous())
        .await?;
    Ok(Json(MarkListResponse { kind, data }))
}

/// `GET /me/{kind}/{shop_id}`: Is the flag set?
///
/// # Errors
///
/// Returns [`MeshimapError::InvalidRequest`] for an unknown kind.
#[utoipa::path(
    get,
    path = "/api/v1/me/{kind}/{shop_id}",
    tag = "Marks",
    summary = "Check a mark",
    description = "Reports whether the signed-in user has set the flag. Anonymous callers always get `false`.",
    params(
        ("kind" = String, Path, description = "`bookmarks` or `visited`"),
        ("shop_id" = String, Path, description = "Shop ID"),
        ("x-user-id" = Option<String>, Header, description = "Signed-in user"),
    ),
    responses(
        (status = 200, description = "Flag state", body = MarkStateResponse),
        (status = 400, description = "Unknown kind", body = ErrorResponse),
    )
)]
pub async fn mark_state(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((kind, shop_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, MeshimapError> {
    let kind: MarkKind = kind.parse()?;
    let shop_id = ShopId::new(shop_id);
    let present = state
        .mark_service
        .exists(kind, &user.or_anonymous(), &shop_id)
        .await?;
    Ok(Json(MarkStateResponse {
        kind,
        shop_id,
        present,
    }))
}

/// `POST /me/{kind}/{shop_id}/toggle`: Flip the flag.
///
/// # Errors
///
/// Returns [`MeshimapError::Unauthenticated`] without touching the store
/// when nobody is signed in, and [`MeshimapError::ShopNotFound`] for an
/// unknown shop.
#[utoipa::path(
    post,
    path = "/api/v1/me/{kind}/{shop_id}/toggle",
    tag = "Marks",
    summary = "Toggle a mark",
    description = "Sets the flag if unset, clears it if set, and returns the new state.",
    params(
        ("kind" = String, Path, description = "`bookmarks` or `visited`"),
        ("shop_id" = String, Path, description = "Shop ID"),
        ("x-user-id" = String, Header, description = "Signed-in user"),
    ),
    responses(
        (status = 200, description = "New flag state", body = MarkStateResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Shop not found", body = ErrorResponse),
    )
)]
pub async fn toggle_mark(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((kind, shop_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, MeshimapError> {
    let kind: MarkKind = kind.parse()?;
    let user_id = user.require()?;
    let shop = state
        .shop_service
        .find_markable(&ShopId::new(shop_id))
        .await?;
    let present = state.mark_service.toggle(kind, &user_id, &shop).await?;
    Ok(Json(MarkStateResponse {
        kind,
        shop_id: shop.id,
        present,
    }))
}

/// `DELETE /me/{kind}/{shop_id}`: Clear the flag.
///
/// # Errors
///
/// Returns [`MeshimapError::Unauthenticated`] when nobody is signed in.
#[utoipa::path(
    delete,
    path = "/api/v1/me/{kind}/{shop_id}",
    tag = "Marks",
    summary = "Remove a mark",
    params(
        ("kind" = String, Path, description = "`bookmarks` or `visited`"),
        ("shop_id" = String, Path, description = "Shop ID"),
        ("x-user-id" = String, Header, description = "Signed-in user"),
    ),
    responses(
        (status = 204, description = "Mark cleared (or was not set)"),
        (status = 401, description = "Not signed in", body = ErrorResponse),
    )
)]
pub async fn remove_mark(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((kind, shop_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, MeshimapError> {
    let kind: MarkKind = kind.parse()?;
    let user_id = user.require()?;
    state
        .mark_service
        .remove(kind, &user_id, &ShopId::new(shop_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me/{kind}", get(list_marks))
        .route("/me/{kind}/{shop_id}", get(mark_state).delete(remove_mark))
        .route("/me/{kind}/{shop_id}/toggle", post(toggle_mark))
}
