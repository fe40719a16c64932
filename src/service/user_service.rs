//! User service: profile documents kept alongside the auth provider.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::user::profile_path;
use crate::domain::{UserId, UserProfile};
use crate::error::MeshimapError;
use crate::store::{DocumentStore, Fields};

/// Identity fields the auth provider reports for the signed-in user.
#[derive(Debug, Clone, Default)]
pub struct AuthIdentity {
    /// Provider display name; may be empty.
    pub display_name: String,
    /// Sign-in e-mail.
    pub email: String,
    /// Avatar URL; may be empty.
    pub photo_url: String,
}

/// Creates and updates `users/{uid}` profile documents.
#[derive(Debug, Clone)]
pub struct UserService {
    store: Arc<dyn DocumentStore>,
}

impl UserService {
    /// Creates a new `UserService`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Writes the initial profile right after e-mail registration,
    /// replacing any existing document.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::Unauthenticated`] for a blank user ID or
    /// [`MeshimapError::Store`] on store failure.
    pub async fn register(
        &self,
        user_id: &UserId,
        identity: &AuthIdentity,
    ) -> Result<UserProfile, MeshimapError> {
        if user_id.is_empty() {
            return Err(MeshimapError::Unauthenticated);
        }
        let path = profile_path(user_id)?;
        self.store
            .set(&path, identity_fields(identity), &["createdAt", "updatedAt"])
            .await?;
        tracing::info!(%user_id, "user registered");
        self.get_profile(user_id).await
    }

    /// Records a sign-in. The first sign-in creates the profile from the
    /// provider identity; later ones only refresh `updatedAt` and never
    /// overwrite fields the user may have edited.
    ///
    /// Returns the profile and whether it was created by this call.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::Unauthenticated`] for a blank user ID or
    /// [`MeshimapError::Store`] on store failure.
    pub async fn sign_in(
        &self,
        user_id: &UserId,
        identity: &AuthIdentity,
    ) -> Result<(UserProfile, bool), MeshimapError> {
        if user_id.is_empty() {
            return Err(MeshimapError::Unauthenticated);
        }
        let path = profile_path(user_id)?;
        let created = if self.store.get(&path).await?.is_some() {
            self.store
                .merge(&path, Fields::new(), &["updatedAt"])
                .await?;
            false
        } else {
            let mut fields = identity_fields(identity);
            fields.insert("uid".into(), Value::String(user_id.to_string()));
            self.store
                .set(&path, fields, &["createdAt", "updatedAt"])
                .await?;
            true
        };
        tracing::info!(%user_id, created, "user signed in");
        Ok((self.get_profile(user_id).await?, created))
    }

    /// Reads a profile.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::UserNotFound`] if there is none.
    pub async fn get_profile(&self, user_id: &UserId) -> Result<UserProfile, MeshimapError> {
        if user_id.is_empty() {
            return Err(MeshimapError::Unauthenticated);
        }
        match self.store.get(&profile_path(user_id)?).await? {
            Some(doc) => doc.decode(),
            None => Err(MeshimapError::UserNotFound(user_id.to_string())),
        }
    }

    /// Profile edit from My Page: writes the display name and, when
    /// given, the e-mail address, and refreshes `updatedAt`.
    ///
    /// The profile must already exist; an edit never creates one.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::UserNotFound`] if there is no profile,
    /// [`MeshimapError::Unauthenticated`] for a blank user ID, or
    /// [`MeshimapError::Store`] on store failure.
    pub async fn update_profile(
        &self,
        user_id: &UserId,
        display_name: &str,
        email: Option<&str>,
    ) -> Result<UserProfile, MeshimapError> {
        if user_id.is_empty() {
            return Err(MeshimapError::Unauthenticated);
        }
        let path = profile_path(user_id)?;
        if self.store.get(&path).await?.is_none() {
            return Err(MeshimapError::UserNotFound(user_id.to_string()));
        }

        let mut fields = Fields::new();
        fields.insert(
            "displayName".into(),
            Value::String(display_name.trim().to_string()),
        );
        if let Some(email) = email {
            fields.insert("email".into(), Value::String(email.trim().to_string()));
        }
        self.store.merge(&path, fields, &["updatedAt"]).await?;
        tracing::info!(%user_id, email_changed = email.is_some(), "profile updated");
        self.get_profile(user_id).await
    }
}

fn identity_fields(identity: &AuthIdentity) -> Fields {
    let mut fields = Fields::new();
    fields.insert(
        "displayName".into(),
        Value::String(identity.display_name.clone()),
    );
    fields.insert("email".into(), Value::String(identity.email.clone()));
    fields.insert("photoURL".into(), Value::String(identity.photo_url.clone()));
    fields
}
