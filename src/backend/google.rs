//! [`DocumentBackend`] over the Google Slides v1 and Drive v3 REST APIs.

use super::model::Presentation;
use super::requests::Request;
use super::{auth, DocumentBackend, Permission};
use crate::error::BackendError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

const SLIDES_API: &str = "https://slides.googleapis.com/v1/presentations";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";

/// Authenticated client for Slides + Drive.
pub struct GoogleSlidesBackend {
    http: reqwest::Client,
    token: String,
    slides_base: String,
    drive_base: String,
}

impl GoogleSlidesBackend {
    /// Resolve credentials (see [`auth::access_token`]) and build a client.
    pub async fn connect(token_file: &Path) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("edgequake-slides/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let token = auth::access_token(&http, token_file).await?;
        Ok(Self::with_token(http, token))
    }

    /// Build a client around an already-resolved bearer token.
    pub fn with_token(http: reqwest::Client, token: impl Into<String>) -> Self {
        Self {
            http,
            token: token.into(),
            slides_base: SLIDES_API.to_string(),
            drive_base: DRIVE_FILES_API.to_string(),
        }
    }

    /// Point the client at different API roots (proxies, emulators).
    pub fn with_endpoints(mut self, slides: impl Into<String>, drive: impl Into<String>) -> Self {
        self.slides_base = slides.into();
        self.drive_base = drive.into();
        self
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = builder
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[derive(Serialize)]
struct CreateBody<'a> {
    title: &'a str,
}

#[derive(Serialize)]
struct BatchUpdateBody<'a> {
    requests: &'a [Request],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateResponse {
    #[serde(default)]
    replies: Vec<serde_json::Value>,
}

#[async_trait]
impl DocumentBackend for GoogleSlidesBackend {
    async fn create_presentation(&self, title: &str) -> Result<Presentation, BackendError> {
        let p: Presentation = self
            .send(self.http.post(&self.slides_base).json(&CreateBody { title }))
            .await?;
        info!("Created presentation {}", p.presentation_id);
        Ok(p)
    }

    async fn batch_update(
        &self,
        presentation_id: &str,
        requests: &[Request],
    ) -> Result<(), BackendError> {
        let url = format!("{}/{}:batchUpdate", self.slides_base, presentation_id);
        let resp: BatchUpdateResponse = self
            .send(self.http.post(url).json(&BatchUpdateBody { requests }))
            .await?;
        debug!(
            "batchUpdate on {}: {} requests, {} replies",
            presentation_id,
            requests.len(),
            resp.replies.len()
        );
        Ok(())
    }

    async fn get_presentation(&self, presentation_id: &str) -> Result<Presentation, BackendError> {
        let url = format!("{}/{}", self.slides_base, presentation_id);
        self.send(self.http.get(url)).await
    }

    async fn grant_permission(
        &self,
        presentation_id: &str,
        permission: &Permission,
    ) -> Result<(), BackendError> {
        let url = format!("{}/{}/permissions", self.drive_base, presentation_id);
        let _: serde_json::Value = self.send(self.http.post(url).json(permission)).await?;
        info!(
            "Granted {} access to {} on {}",
            permission.role, permission.scope, presentation_id
        );
        Ok(())
    }
}

/// Google's error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

fn api_error(status: u16, body: &str) -> BackendError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => match env.error.status {
            Some(s) => format!("{s}: {}", env.error.message),
            None => env.error.message,
        },
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    };
    if status == 401 || status == 403 {
        return BackendError::Auth(format!("HTTP {status}: {message}"));
    }
    BackendError::Api { status, message }
}
