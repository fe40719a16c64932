//! Profile handlers: registration, sign-in, My Page profile.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::auth::CurrentUser;
use crate::api::dto::{IdentityRequest, SignInResponse, UpdateProfileRequest};
use crate::app_state::AppState;
use crate::domain::UserProfile;
use crate::error::{ErrorResponse, MeshimapError};
use crate::service::AuthIdentity;

/// `POST /me/register`: Write the initial profile after e-mail sign-up.
///
/// # Errors
///
/// Returns [`MeshimapError::Unauthenticated`] when nobody is signed in.
#[utoipa::path(
    post,
    path = "/api/v1/me/register",
    tag = "Users",
    summary = "Register a profile",
    description = "Creates or replaces the profile document for the signed-in user.",
    params(
        ("x-user-id" = String, Header, description = "Signed-in user"),
    ),
    request_body = IdentityRequest,
    responses(
        (status = 201, description = "Profile created", body = UserProfile),
        (status = 401, description = "Not signed in", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<IdentityRequest>,
) -> Result<impl IntoResponse, MeshimapError> {
    let user_id = user.require()?;
    let identity: AuthIdentity = req.into();
    let profile = state.user_service.register(&user_id, &identity).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// `POST /me/sign-in`: Record a sign-in, creating the profile on first use.
///
/// # Errors
///
/// Returns [`MeshimapError::Unauthenticated`] when nobody is signed in.
#[utoipa::path(
    post,
    path = "/api/v1/me/sign-in",
    tag = "Users",
    summary = "Sign in",
    description = "Creates the profile from the provider identity on first sign-in; later sign-ins only refresh `updatedAt`.",
    params(
        ("x-user-id" = String, Header, description = "Signed-in user"),
    ),
    request_body = IdentityRequest,
    responses(
        (status = 200, description = "Profile after sign-in", body = SignInResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<IdentityRequest>,
) -> Result<impl IntoResponse, MeshimapError> {
    let user_id = user.require()?;
    let identity: AuthIdentity = req.into();
    let (profile, created) = state.user_service.sign_in(&user_id, &identity).await?;
    Ok(Json(SignInResponse { profile, created }))
}

/// `GET /me/profile`: Read the signed-in user's profile.
///
/// # Errors
///
/// Returns [`MeshimapError::UserNotFound`] if no profile was written yet.
#[utoipa::path(
    get,
    path = "/api/v1/me/profile",
    tag = "Users",
    summary = "Get profile",
    params(
        ("x-user-id" = String, Header, description = "Signed-in user"),
    ),
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "No profile", body = ErrorResponse),
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, MeshimapError> {
    let user_id = user.require()?;
    let profile = state.user_service.get_profile(&user_id).await?;
    Ok(Json(profile))
}

/// `PATCH /me/profile`: Change the display name and e-mail.
///
/// # Errors
///
/// Returns [`MeshimapError::UserNotFound`] if no profile was written yet.
#[utoipa::path(
    patch,
    path = "/api/v1/me/profile",
    tag = "Users",
    summary = "Update profile",
    params(
        ("x-user-id" = String, Header, description = "Signed-in user"),
    ),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "No profile", body = ErrorResponse),
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, MeshimapError> {
    let user_id = user.require()?;
    let profile = state
        .user_service
        .update_profile(&user_id, &req.display_name, req.email.as_deref())
        .await?;
    Ok(Json(profile))
}

/// Profile routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me/register", post(register))
        .route("/me/sign-in", post(sign_in))
        .route("/me/profile", get(get_profile).patch(update_profile))
}
