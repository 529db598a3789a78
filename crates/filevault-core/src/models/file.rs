//! Stored-file records and paginated listings as returned by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored file as the server reports it. Never mutated locally; any
/// change to the result set comes from a fresh fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i64,
    pub filename: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Pagination metadata attached to every listing response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(rename = "currentPage")]
    pub current_page: u32,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
    #[serde(rename = "totalFiles")]
    pub total_files: u64,
}

/// One page of results. Recomputed wholesale on every fetch, never patched
/// in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultPage {
    pub files: Vec<FileRecord>,
    pub pagination: PageInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_page_deserializes_wire_shape() {
        let json = r#"{
            "files": [{
                "id": 7,
                "filename": "report.pdf",
                "size_bytes": 2048,
                "mime_type": "application/pdf",
                "created_at": "2024-03-01T12:00:00Z",
                "download_count": 3
            }],
            "pagination": {"currentPage": 2, "totalPages": 5, "totalFiles": 93}
        }"#;

        let page: ResultPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.files.len(), 1);
        assert_eq!(page.files[0].filename, "report.pdf");
        assert_eq!(page.files[0].download_count, Some(3));
        assert!(page.files[0].tags.is_none());
        assert_eq!(page.pagination.current_page, 2);
        assert_eq!(page.pagination.total_files, 93);
    }
}
