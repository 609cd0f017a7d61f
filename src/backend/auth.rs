//! OAuth access tokens for the Slides and Drive APIs.
//!
//! Two sources, checked in order:
//!
//! 1. `GOOGLE_ACCESS_TOKEN`: a bearer token minted elsewhere
//!    (`gcloud auth print-access-token`, a CI secret, …).
//! 2. An authorised-user credentials file (`token.json`), the format written
//!    by Google's client libraries after the consent flow. When it holds a
//!    refresh token we exchange it for a fresh access token; otherwise the
//!    stored `token` is used as-is.
//!
//! The browser consent flow itself is out of scope: the file must exist.

use crate::error::BackendError;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Scopes the generator needs: edit presentations, share files.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/presentations",
    "https://www.googleapis.com/auth/drive",
];

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Contents of an authorised-user credentials file.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizedUser {
    #[serde(default, alias = "access_token")]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
    /// Scopes granted at consent time, when the file records them.
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl AuthorizedUser {
    /// Read and decode a credentials file.
    pub fn from_file(path: &Path) -> Result<Self, BackendError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BackendError::Auth(format!(
                "cannot read credentials file '{}': {e}\n\
                 Complete the Google OAuth consent flow once to create it, \
                 or set GOOGLE_ACCESS_TOKEN.",
                path.display()
            ))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            BackendError::Auth(format!(
                "credentials file '{}' is not valid JSON: {e}",
                path.display()
            ))
        })
    }

    /// Entries of [`SCOPES`] the file does not record as granted.
    ///
    /// Empty when the file lists no scopes at all.
    pub fn missing_scopes(&self) -> Vec<&'static str> {
        if self.scopes.is_empty() {
            return Vec::new();
        }
        SCOPES
            .iter()
            .copied()
            .filter(|wanted| !self.scopes.iter().any(|s| s == wanted))
            .collect()
    }

    /// The refresh grant, if the file carries everything it needs.
    fn refresh_grant(&self) -> Option<[(&'static str, &str); 4]> {
        Some([
            ("client_id", self.client_id.as_deref()?),
            ("client_secret", self.client_secret.as_deref()?),
            ("refresh_token", self.refresh_token.as_deref()?),
            ("grant_type", "refresh_token"),
        ])
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Resolve a bearer token from the environment or `token_file`.
pub async fn access_token(
    http: &reqwest::Client,
    token_file: &Path,
) -> Result<String, BackendError> {
    if let Ok(token) = std::env::var("GOOGLE_ACCESS_TOKEN") {
        if !token.is_empty() {
            debug!("Using access token from GOOGLE_ACCESS_TOKEN");
            return Ok(token);
        }
    }

    let user = AuthorizedUser::from_file(token_file)?;
    token_for(http, &user).await
}

/// Exchange or reuse the credentials in `user`.
pub async fn token_for(
    http: &reqwest::Client,
    user: &AuthorizedUser,
) -> Result<String, BackendError> {
    let missing = user.missing_scopes();
    if !missing.is_empty() {
        warn!(
            "Credentials were granted without {}; Google calls may be refused",
            missing.join(", ")
        );
    }

    if let Some(grant) = user.refresh_grant() {
        let uri = user.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI);
        return refresh(http, uri, &grant).await;
    }

    match user.token.as_deref() {
        Some(t) if !t.is_empty() => {
            debug!("Using stored access token (no refresh token available)");
            Ok(t.to_string())
        }
        _ => Err(BackendError::Auth(
            "credentials file has neither a refresh token nor an access token".into(),
        )),
    }
}

async fn refresh(
    http: &reqwest::Client,
    token_uri: &str,
    grant: &[(&'static str, &str)],
) -> Result<String, BackendError> {
    let response = http
        .post(token_uri)
        .form(grant)
        .send()
        .await
        .map_err(|e| BackendError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BackendError::Auth(format!(
            "token refresh rejected (HTTP {}): {}",
            status.as_u16(),
            body.trim()
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| BackendError::Decode(e.to_string()))?;
    info!(
        "Refreshed Google access token (expires in {}s)",
        token.expires_in.unwrap_or(0)
    );
    Ok(token.access_token)
}
