//! Source hosting API client

use openapi_client::models::Repository;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::errors::ServiceError;
use crate::http::client::{HttpClient, HttpOptions};
use crate::http::errors::ApiError;

/// Client for the source hosting REST API
pub struct SourceClient {
    http: HttpClient,
    token: Option<SecretString>,
}

impl SourceClient {
    pub fn new(
        base_url: &str,
        token: Option<SecretString>,
        options: &HttpOptions,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            http: HttpClient::new(base_url, options)?,
            token,
        })
    }

    /// Fetch repository metadata by `owner/name`
    pub async fn get_repository(&self, full_name: &str) -> Result<Repository, ApiError> {
        let path = format!("/repos/{}", full_name.trim_matches('/'));
        debug!("Looking up repository {}", full_name);
        let token = self
            .token
            .as_ref()
            .map(|t| t.expose_secret())
            .unwrap_or_default();
        self.http.get(&path, &[], token).await
    }
}
