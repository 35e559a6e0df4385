//! Session establishment and teardown.
//!
//! Exchanges OAuth authorization codes or native-SDK identity tokens for a
//! credential triplet, persists it, and exposes logout. The native Google /
//! Apple sign-in SDKs stay opaque to this crate; callers hand over whatever
//! token those SDKs produced.

use crate::gateway::ApiClient;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use wayfare_types::{CredentialKey, Session, TokenResponse, traits::Result};

/// Identity providers accepted by the verification endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityProvider {
    Google,
    Apple,
}

impl fmt::Display for IdentityProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
            Self::Apple => write!(f, "apple"),
        }
    }
}

/// Authentication operations against the API gateway.
pub struct AuthService {
    api: Arc<ApiClient>,
}

impl AuthService {
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Exchanges an OAuth authorization code for a token pair.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`wayfare_types::ApiError`] on failure.
    pub async fn oauth_callback(&self, provider: &str, code: &str) -> Result<TokenResponse> {
        self.api
            .post(
                &format!("/api/auth/oauth2/callback/{provider}"),
                json!({ "code": code }),
            )
            .await
    }

    /// Verifies a native-SDK identity token and returns a token pair.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`wayfare_types::ApiError`] on failure.
    pub async fn verify_id_token(
        &self,
        provider: IdentityProvider,
        id_token: &str,
    ) -> Result<TokenResponse> {
        self.api
            .post(
                &format!("/api/v1/auth/{provider}/verify"),
                json!({ "idToken": id_token }),
            )
            .await
    }

    /// Persists the credential triplet (and optional email) in one batch
    /// write, establishing the session.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the batch write fails.
    pub async fn persist_session(
        &self,
        token: &TokenResponse,
        email: Option<&str>,
    ) -> Result<()> {
        let mut entries = vec![
            (CredentialKey::AccessToken, token.access_token.clone()),
            (CredentialKey::RefreshToken, token.refresh_token.clone()),
            (CredentialKey::UserId, token.user_id.to_string()),
        ];
        if let Some(email) = email {
            entries.push((CredentialKey::UserEmail, email.to_string()));
        }
        self.api.store().set_many(&entries).await
    }

    /// Loads the stored session, if complete. A partial triplet (any of the
    /// three fields missing) counts as no session.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read.
    pub async fn load_session(&self) -> Result<Option<Session>> {
        let map = self
            .api
            .store()
            .get_many(&[
                CredentialKey::AccessToken,
                CredentialKey::RefreshToken,
                CredentialKey::UserId,
            ])
            .await?;
        Ok(
            match (
                map.get(&CredentialKey::AccessToken),
                map.get(&CredentialKey::RefreshToken),
                map.get(&CredentialKey::UserId),
            ) {
                (Some(access), Some(refresh), Some(user_id)) => Some(Session {
                    access_token: access.clone(),
                    refresh_token: refresh.clone(),
                    user_id: user_id.clone(),
                }),
                _ => None,
            },
        )
    }

    /// Clears every stored credential.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the clear fails.
    pub async fn logout(&self) -> Result<()> {
        self.api.store().clear(&CredentialKey::ALL).await
    }

    /// Whether a complete session is currently stored.
    pub async fn is_authenticated(&self) -> bool {
        matches!(self.load_session().await, Ok(Some(_)))
    }
}
