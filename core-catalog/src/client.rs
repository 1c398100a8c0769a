//! API client core: URL building, token injection, error mapping.

use crate::error::{CatalogError, Result};
use crate::resources::{Albums, Artists, Playlists, Tracks};
use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Supplies the bearer token for catalog requests and absorbs 401s.
///
/// Implemented by the composition root as an adapter over the auth session,
/// so the catalog crate stays independent of `core-auth`.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Current bearer token, if a session is active.
    async fn token(&self) -> Option<String>;

    /// Called when the API rejects the token; implementations invalidate the
    /// stored session so the host can route to login.
    async fn handle_unauthorized(&self);
}

/// Backend error envelope: `{ "error": { "code": ..., "message": ... } }`.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Typed client for the catalog REST API.
pub struct ApiClient {
    http: Arc<dyn HttpClient>,
    tokens: Arc<dyn TokenSource>,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    /// Create a client with the default 10 second per-request timeout.
    pub fn new(
        http: Arc<dyn HttpClient>,
        tokens: Arc<dyn TokenSource>,
        base_url: &str,
    ) -> Result<Self> {
        Self::with_timeout(http, tokens, base_url, Duration::from_secs(10))
    }

    pub fn with_timeout(
        http: Arc<dyn HttpClient>,
        tokens: Arc<dyn TokenSource>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            http,
            tokens,
            base_url,
            timeout,
        })
    }

    pub fn tracks(&self) -> Tracks<'_> {
        Tracks { client: self }
    }

    pub fn albums(&self) -> Albums<'_> {
        Albums { client: self }
    }

    pub fn artists(&self) -> Artists<'_> {
        Artists { client: self }
    }

    pub fn playlists(&self) -> Playlists<'_> {
        Playlists { client: self }
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.url(path, query)?;
        let request = HttpRequest::new(HttpMethod::Get, url.as_str());
        let response = self.send(request).await?;
        decode(&response)
    }

    pub(crate) async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path, &[])?;
        let request = HttpRequest::new(HttpMethod::Post, url.as_str())
            .json(body)
            .map_err(CatalogError::Transport)?;
        let response = self.send(request).await?;
        decode(&response)
    }

    pub(crate) async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.url(path, &[])?;
        let request = HttpRequest::new(HttpMethod::Post, url.as_str())
            .json(body)
            .map_err(CatalogError::Transport)?;
        self.send(request).await?;
        Ok(())
    }

    pub(crate) async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path, &[])?;
        let request = HttpRequest::new(HttpMethod::Put, url.as_str())
            .json(body)
            .map_err(CatalogError::Transport)?;
        let response = self.send(request).await?;
        decode(&response)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path, &[])?;
        let request = HttpRequest::new(HttpMethod::Delete, url.as_str());
        self.send(request).await?;
        Ok(())
    }

    async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse> {
        if let Some(token) = self.tokens.token().await {
            request = request.bearer_token(token);
        }
        request = request.timeout(self.timeout);

        debug!(url = %request.url, "catalog request");
        let response = self.http.execute(request).await?;

        if response.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ApiErrorEnvelope>()
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| format!("HTTP {}", response.status));

        match response.status {
            401 => {
                warn!("catalog request rejected with 401, invalidating session");
                self.tokens.handle_unauthorized().await;
                Err(CatalogError::Unauthorized)
            }
            404 => Err(CatalogError::NotFound(message)),
            status => Err(CatalogError::Api { status, message }),
        }
    }
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    response
        .json()
        .map_err(|e| CatalogError::Decode(e.to_string()))
}
