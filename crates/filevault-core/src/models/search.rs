//! Search filter set and its query-string projection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Filters for the search endpoint. Absent fields are omitted from the
/// query string entirely; the backend treats empty strings and missing
/// parameters differently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl SearchFilters {
    /// Project the set filters into query pairs. Empty strings count as
    /// unset.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(name) = self.filename.as_deref().filter(|s| !s.is_empty()) {
            query.push(("filename", name.to_string()));
        }
        if let Some(mime) = self.mime_type.as_deref().filter(|s| !s.is_empty()) {
            query.push(("mime_type", mime.to_string()));
        }
        if let Some(min) = self.min_size_bytes {
            query.push(("min_size_bytes", min.to_string()));
        }
        if let Some(max) = self.max_size_bytes {
            query.push(("max_size_bytes", max.to_string()));
        }
        if let Some(start) = self.start_date {
            query.push(("start_date", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            query.push(("end_date", end.format("%Y-%m-%d").to_string()));
        }
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(size) = self.page_size {
            query.push(("pageSize", size.to_string()));
        }
        query
    }

    /// True when at least one filter is set.
    pub fn has_filters(&self) -> bool {
        !self.to_query().is_empty()
    }
}
