//! Profile DTOs for registration, sign-in and edit.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::UserProfile;
use crate::service::AuthIdentity;

/// Identity fields forwarded from the auth provider on registration and
/// sign-in.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct IdentityRequest {
    /// Provider display name.
    #[serde(default, alias = "displayName")]
    pub display_name: String,
    /// Sign-in e-mail.
    #[serde(default)]
    pub email: String,
    /// Avatar URL.
    #[serde(default, alias = "photoURL")]
    pub photo_url: String,
}

impl From<IdentityRequest> for AuthIdentity {
    fn from(req: IdentityRequest) -> Self {
        Self {
            display_name: req.display_name,
            email: req.email,
            photo_url: req.photo_url,
        }
    }
}

/// Response body for `POST /me/sign-in`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SignInResponse {
    /// The stored profile after sign-in.
    pub profile: UserProfile,
    /// `true` if this was the first sign-in.
    pub created: bool,
}

/// Request body for `PATCH /me/profile`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    /// New display name.
    #[serde(alias = "displayName")]
    pub display_name: String,
    /// New e-mail address; left unchanged when omitted.
    #[serde(default)]
    pub email: Option<String>,
}
