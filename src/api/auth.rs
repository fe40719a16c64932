//! Caller identity from the auth proxy.
//!
//! Authentication happens in front of this service; the proxy forwards
//! the verified user ID in the `x-user-id` header. A missing or blank
//! header means nobody is signed in.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::UserId;
use crate::error::MeshimapError;

/// Header carrying the verified user ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The signed-in user, if any.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<UserId>);

impl CurrentUser {
    /// Returns the user ID or rejects the request as unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::Unauthenticated`] if nobody is signed in.
    pub fn require(self) -> Result<UserId, MeshimapError> {
        self.0.ok_or(MeshimapError::Unauthenticated)
    }

    /// Returns the user ID, or an empty one when nobody is signed in.
    #[must_use]
    pub fn or_anonymous(self) -> UserId {
        self.0.unwrap_or_else(|| UserId::new(""))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(UserId::new);
        Ok(Self(user))
    }
}
