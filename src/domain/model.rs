use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::utils::error::GatewayError;

/// 目前持有的存取權杖，整組替換、不會部分更新
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub expiry: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(access_token: String, expiry: DateTime<Utc>) -> Self {
        Self {
            access_token,
            expiry: Some(expiry),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty()
    }

    /// 權杖存在，且 `now + buffer` 仍早於到期時間
    pub fn is_fresh(&self, now: DateTime<Utc>, buffer: chrono::Duration) -> bool {
        match self.expiry {
            Some(expiry) if !self.is_empty() => now + buffer < expiry,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    #[default]
    Html,
    Text,
}

impl ContentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentFormat::Html => "html",
            ContentFormat::Text => "text",
        }
    }

    /// 空字串或未提供時預設為 html
    pub fn parse_optional(value: Option<&str>) -> Result<Self, GatewayError> {
        match value {
            None | Some("") => Ok(ContentFormat::Html),
            Some(other) => other.parse(),
        }
    }
}

impl FromStr for ContentFormat {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(ContentFormat::Html),
            "text" => Ok(ContentFormat::Text),
            _ => Err(GatewayError::validation("Format must be 'html' or 'text'")),
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `POST /content` 的請求內容
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ContentRequest {
    /// The post ID to retrieve
    #[serde(default)]
    pub post_id: String,
    /// Format of the returned content: `html` (default) or `text`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "html")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContentResult {
    pub content: String,
    pub format: ContentFormat,
    pub post_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub char_count: usize,
}

impl ContentResult {
    pub fn new(post_id: String, title: Option<String>, format: ContentFormat, content: String) -> Self {
        let char_count = content.chars().count();
        Self {
            content,
            format,
            post_id,
            title: title.filter(|t| !t.is_empty()),
            char_count,
        }
    }
}

/// 上游貼文附帶的 key/type/value 欄位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingField {
    pub key: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(default)]
    pub value: String,
}

/// 上游回傳、尚未正規化的貼文內容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPost {
    pub content: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenStatus {
    pub status: String,
    pub token_preview: String,
    pub expiry: Option<DateTime<Utc>>,
    pub is_valid: bool,
    pub expires_in: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub status: String,
    pub message: String,
}
