use crate::core::normalizer;
use crate::domain::model::{ContentFormat, ContentRequest, ContentResult};
use crate::domain::ports::ContentSource;
use crate::utils::error::{GatewayError, Result, ResultExt};
use std::sync::Arc;

/// 驗證請求、抓取內容、正規化並組成回應
pub struct ContentService {
    source: Arc<dyn ContentSource>,
}

impl ContentService {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    pub async fn get_content(&self, request: ContentRequest) -> Result<ContentResult> {
        let format = validate_request(&request)?;

        tracing::debug!(post_id = %request.post_id, %format, "Fetching post content");
        let post = self
            .source
            .fetch_content(&request.post_id)
            .await
            .context("Error fetching content")?;

        let content = normalizer::normalize(&post.content, format);
        let result = ContentResult::new(request.post_id, post.title, format, content);

        tracing::info!(
            post_id = %result.post_id,
            format = %result.format,
            char_count = result.char_count,
            "📄 Content retrieved"
        );
        Ok(result)
    }
}

/// 在任何網路呼叫之前拒絕無效輸入
pub fn validate_request(request: &ContentRequest) -> Result<ContentFormat> {
    if request.post_id.is_empty() {
        return Err(GatewayError::validation("Post ID is required"));
    }
    ContentFormat::parse_optional(request.format.as_deref())
}
