//! HTTP client implementation

use std::time::Duration;

use reqwest::{header, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use crate::errors::ServiceError;
use crate::http::errors::ApiError;

/// HTTP client options
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Per-request timeout
    pub timeout: Duration,

    /// Sent as the User-Agent header
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("launchpad/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// JSON-over-HTTP client bound to one API base URL
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(base_url: &str, options: &HttpOptions) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(|e| ServiceError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Make a GET request, authenticated unless `token` is empty
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        token: &str,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!("GET {}", url);

        let request = authorize(self.client.get(&url).query(query), token);
        self.send("GET", request).await
    }

    /// Make a POST request with a JSON body, authenticated unless `token` is empty
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        token: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!("POST {}", url);

        let request = authorize(self.client.post(&url).query(query), token).json(body);
        self.send("POST", request).await
    }

    /// Make a POST request with a JSON body, ignoring the success body
    pub async fn post_discard<B: Serialize>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        token: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let url = self.url(path);
        debug!("POST {}", url);

        let request = authorize(self.client.post(&url).query(query), token).json(body);
        self.send_checked("POST", request).await?;
        Ok(())
    }

    /// Make an unauthenticated form-encoded POST request
    pub async fn post_form<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        form: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!("POST {} (form)", url);

        let request = self.client.post(&url).form(form);
        self.send("POST", request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send_checked(method, request).await?;
        let body = response.json().await?;
        Ok(body)
    }

    async fn send_checked(&self, method: &str, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("HTTP {} failed: {} - {}", method, status, body);
            return Err(ApiError::Status { status, body });
        }

        Ok(response)
    }
}

fn authorize(request: RequestBuilder, token: &str) -> RequestBuilder {
    if token.is_empty() {
        request
    } else {
        request.bearer_auth(token)
    }
}
