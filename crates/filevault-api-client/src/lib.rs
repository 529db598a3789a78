//! Shared HTTP client for the filevault backend.
//!
//! Provides a minimal client with bearer-token auth sourced from a shared
//! [`SessionContext`], generic GET/POST/DELETE helpers, and domain methods
//! (upload, list, search, delete, stats). Errors are the typed
//! [`ClientError`] taxonomy so callers can branch on auth failures.

pub mod api;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use filevault_core::ClientError;

pub use api::LoginResponse;
pub use session::SessionContext;

/// HTTP client for the filevault backend. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionContext>,
}

impl ApiClient {
    pub fn new(base_url: String, session: Arc<SessionContext>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, session, Duration::from_secs(60))
    }

    pub fn with_timeout(
        base_url: String,
        session: Arc<SessionContext>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Create a client from FILEVAULT_API_URL (or API_URL), seeding the
    /// session from FILEVAULT_TOKEN when set.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var("FILEVAULT_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        let token = std::env::var("FILEVAULT_TOKEN").ok();

        Self::new(base_url, Arc::new(SessionContext::new(token)))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.token() {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        self.check_status(response).await
    }

    /// Map non-success statuses into the error taxonomy. A 401 tears the
    /// session down before returning.
    async fn check_status(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.session.invalidate();
            return Err(ClientError::Auth("authentication required".to_string()));
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(format!("failed to parse response as JSON: {}", e)))
    }

    /// GET request with optional query parameters. Deserializes JSON.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let mut request = self.apply_auth(self.client.get(self.build_url(path)));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = self.send(request).await?;
        self.read_json(response).await
    }

    /// GET request returning the raw body bytes.
    pub async fn get_bytes(&self, path: &str) -> Result<bytes::Bytes, ClientError> {
        let request = self.apply_auth(self.client.get(self.build_url(path)));
        let response = self.send(request).await?;
        response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(format!("failed to read response body: {}", e)))
    }

    /// POST a JSON body and deserialize the response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let request = self.apply_auth(self.client.post(self.build_url(path)).json(body));
        let response = self.send(request).await?;
        self.read_json(response).await
    }

    /// POST a JSON body, ignoring any response payload.
    pub async fn post_json_unit<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ClientError> {
        let request = self.apply_auth(self.client.post(self.build_url(path)).json(body));
        self.send(request).await?;
        Ok(())
    }

    /// POST a multipart form and deserialize the response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ClientError> {
        let request = self.apply_auth(self.client.post(self.build_url(path)).multipart(form));
        let response = self.send(request).await?;
        self.read_json(response).await
    }

    /// DELETE request. Returns Ok(()) on success.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let request = self.apply_auth(self.client.delete(self.build_url(path)));
        self.send(request).await?;
        Ok(())
    }
}
