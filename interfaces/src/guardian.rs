//! Response shapes of the Guardian content API.
//!
//! These are read-only DTOs. Optional parts of the payload (fields, tags,
//! blocks) only appear when the matching `show-*` parameter was requested.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianArticle {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub section_id: String,
    pub section_name: String,
    pub web_publication_date: DateTime<Utc>,
    pub web_title: String,
    pub web_url: String,
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub is_hosted: bool,
    pub pillar_id: Option<String>,
    pub pillar_name: Option<String>,
    pub fields: Option<GuardianArticleFields>,
    #[serde(default)]
    pub tags: Vec<GuardianTag>,
    /// Kept untyped; only passed through to callers that asked for blocks.
    pub blocks: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianArticleFields {
    pub headline: Option<String>,
    pub trail_text: Option<String>,
    pub thumbnail: Option<String>,
    pub body_text: Option<String>,
    pub byline: Option<String>,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub main: Option<String>,
    pub body: Option<String>,
    pub wordcount: Option<String>,
    pub short_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianTag {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub section_id: Option<String>,
    pub section_name: Option<String>,
    pub web_title: String,
    pub web_url: String,
    #[serde(default)]
    pub api_url: String,
    pub bio: Option<String>,
    pub byline_image_url: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianSection {
    pub id: String,
    pub web_title: String,
    pub web_url: String,
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub editions: Vec<GuardianEdition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianEdition {
    pub id: String,
    pub web_title: String,
    pub web_url: String,
    #[serde(default)]
    pub api_url: String,
    pub code: String,
}

/// `{ "response": { ...list... } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardianListResponse<T> {
    pub response: GuardianList<T>,
}

/// Paged list body. The `/sections` endpoint omits the paging fields, so they
/// default to zero there.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianList<T> {
    pub status: String,
    #[serde(default)]
    pub user_tier: String,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub start_index: u64,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub pages: u32,
    pub order_by: Option<String>,
    pub results: Vec<T>,
}

/// `{ "response": { "content": {...} } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardianSingleResponse {
    pub response: GuardianSingle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianSingle {
    pub status: String,
    #[serde(default)]
    pub user_tier: String,
    #[serde(default)]
    pub total: u64,
    pub content: Option<GuardianArticle>,
}

/// Error body: `{ "response": { "status": "error", "message": "..." } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardianErrorResponse {
    pub response: GuardianErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardianErrorBody {
    pub status: String,
    pub message: String,
}
