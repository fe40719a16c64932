//! User profile documents at `users/{uid}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;
use super::mark::USERS_COLLECTION;
use crate::error::MeshimapError;
use crate::store::DocPath;

/// Name shown for users without a stored display name.
pub const ANONYMOUS_DISPLAY_NAME: &str = "匿名ユーザー";

/// Stored fields of a user profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Auth-provider user ID (absent on profiles created at registration).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<UserId>,
    /// Chosen display name; may be empty.
    #[serde(default)]
    pub display_name: String,
    /// Sign-in e-mail address.
    #[serde(default)]
    pub email: String,
    /// Avatar URL; may be empty.
    #[serde(rename = "photoURL", default)]
    pub photo_url: String,
    /// Store-assigned creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Store-assigned time of the last sign-in or edit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Name to show in listings, falling back to
    /// [`ANONYMOUS_DISPLAY_NAME`] when none is set.
    #[must_use]
    pub fn shown_name(&self) -> &str {
        let name = self.display_name.trim();
        if name.is_empty() {
            ANONYMOUS_DISPLAY_NAME
        } else {
            name
        }
    }
}

/// Path of a user's profile document.
///
/// # Errors
///
/// Returns [`MeshimapError::InvalidRequest`] if the ID is blank or contains
/// `/`.
pub fn profile_path(user_id: &UserId) -> Result<DocPath, MeshimapError> {
    DocPath::new(&[USERS_COLLECTION, user_id.as_str()])
}
