use crate::domain::model::{FetchedPost, TokenStatus};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 向上游發放新存取權杖的來源
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue_token(&self, network_domain: &str) -> Result<String>;
}

/// 提供目前有效權杖，並可強制刷新
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_token(&self) -> Result<String>;
    async fn refresh_token(&self) -> Result<()>;
    async fn status(&self) -> TokenStatus;
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_content(&self, post_id: &str) -> Result<FetchedPost>;
}
