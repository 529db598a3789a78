//! Domain methods for the filevault backend.
//!
//! Endpoint shapes follow the backend contract: listings come back as
//! `{files, pagination}`, batch uploads as an ordered outcome array (a bare
//! object for a single-file batch), and absent search parameters are
//! omitted from the query string.

use serde::{Deserialize, Serialize};

use crate::ApiClient;
use filevault_core::models::{FileHandle, ResultPage, SearchFilters, StorageStats, UploadOutcome};
use filevault_core::ClientError;

/// Response to a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

/// The upload endpoint returns an array of outcomes, or a bare object when
/// a single file was submitted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UploadResponse {
    Many(Vec<UploadOutcome>),
    One(UploadOutcome),
}

impl From<UploadResponse> for Vec<UploadOutcome> {
    fn from(response: UploadResponse) -> Self {
        match response {
            UploadResponse::Many(outcomes) => outcomes,
            UploadResponse::One(outcome) => vec![outcome],
        }
    }
}

impl ApiClient {
    /// Authenticate and install the returned token in the shared session.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let body = serde_json::json!({ "username": username, "password": password });
        let response: LoginResponse = self.post_json("/login", &body).await?;
        self.session().set_token(response.token.clone());
        tracing::info!(username = %response.username, "logged in");
        Ok(response)
    }

    /// Create a new account. Does not log in.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let body = serde_json::json!({ "username": username, "password": password });
        self.post_json_unit("/register", &body).await
    }

    /// Forget the local session token.
    pub fn logout(&self) {
        self.session().clear();
    }

    /// Upload a batch of files as one multipart request. Parts are sent in
    /// the order given; the returned outcomes are in the same order, which
    /// is the only correlation key (duplicate filenames are legal).
    pub async fn upload_batch(
        &self,
        files: &[FileHandle],
    ) -> Result<Vec<UploadOutcome>, ClientError> {
        let mut form = reqwest::multipart::Form::new();
        for file in files {
            let mut part = reqwest::multipart::Part::bytes(file.bytes.to_vec())
                .file_name(file.name.clone());
            if let Some(content_type) = &file.content_type {
                part = part.mime_str(content_type).map_err(|e| {
                    ClientError::Validation(format!(
                        "invalid content type '{}' for {}: {}",
                        content_type, file.name, e
                    ))
                })?;
            }
            form = form.part("file", part);
        }

        let response: UploadResponse = self.post_multipart("/upload", form).await?;
        Ok(response.into())
    }

    /// List files with pagination.
    pub async fn list_files(&self, page: u32, page_size: u32) -> Result<ResultPage, ClientError> {
        let query = vec![
            ("page", page.to_string()),
            ("pageSize", page_size.to_string()),
        ];
        self.get("/files", &query).await
    }

    /// Search files. Unset filters are omitted from the query string.
    pub async fn search_files(&self, filters: &SearchFilters) -> Result<ResultPage, ClientError> {
        self.get("/search", &filters.to_query()).await
    }

    /// Delete a file by id.
    pub async fn delete_file(&self, file_id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/files/{}/delete", file_id)).await
    }

    /// Download a file's content.
    pub async fn download_file(&self, file_id: i64) -> Result<bytes::Bytes, ClientError> {
        self.get_bytes(&format!("/files/{}/download", file_id)).await
    }

    /// Fetch aggregate storage statistics.
    pub async fn storage_stats(&self) -> Result<StorageStats, ClientError> {
        self.get("/stats", &[]).await
    }
}
