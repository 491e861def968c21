//! Owner of the single shared upstream access token.
//!
//! Reads go through a shared lock. A refresh holds the exclusive lock for its
//! whole duration, network call included, so at most one issuance request is
//! in flight at a time. Callers that find the token stale queue on the write
//! lock and re-check it before issuing another request.

use crate::config::TokenConfig;
use crate::domain::model::{Credential, TokenStatus};
use crate::domain::ports::{TokenIssuer, TokenProvider};
use crate::utils::error::{GatewayError, Result, ResultExt};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

const PREVIEW_CHARS: usize = 10;

/// chrono 的 `Duration` 有上限，超出範圍的設定值回報為設定錯誤
fn seconds(field: &str, value: u64) -> Result<Duration> {
    i64::try_from(value)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| GatewayError::InvalidConfigValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "duration out of range".to_string(),
        })
}

pub struct TokenManager {
    credential: RwLock<Credential>,
    network_domain: String,
    issuer: Arc<dyn TokenIssuer>,
    lifetime: Duration,
    expiry_buffer: Duration,
}

impl TokenManager {
    pub fn new(
        issuer: Arc<dyn TokenIssuer>,
        network_domain: impl Into<String>,
        config: &TokenConfig,
    ) -> Result<Self> {
        Ok(Self {
            credential: RwLock::new(Credential::default()),
            network_domain: network_domain.into(),
            issuer,
            lifetime: seconds("token.lifetime_seconds", config.lifetime_seconds)?,
            expiry_buffer: seconds("token.expiry_buffer_seconds", config.expiry_buffer_seconds)?,
        })
    }

    pub fn network_domain(&self) -> &str {
        &self.network_domain
    }

    /// 啟動時先取一次權杖；失敗只記錄，下一個請求會再嘗試
    pub async fn initialize(&self) {
        if let Err(e) = self.refresh_token().await {
            tracing::warn!(
                "⚠️ Initial token fetch failed: {}. Will retry on first request.",
                e
            );
        }
    }

    /// Returns the current token, refreshing it first when it is missing or
    /// inside the expiry buffer.
    pub async fn get_token(&self) -> Result<String> {
        {
            let credential = self.credential.read().await;
            if credential.is_fresh(Utc::now(), self.expiry_buffer) {
                return Ok(credential.access_token.clone());
            }
        }

        let mut credential = self.credential.write().await;
        // 排隊期間可能已有其他呼叫者完成刷新
        if !credential.is_fresh(Utc::now(), self.expiry_buffer) {
            tracing::debug!("Access token missing or near expiry, refreshing");
            self.refresh_locked(&mut credential)
                .await
                .context("failed to refresh token")?;
        }

        Ok(credential.access_token.clone())
    }

    /// Unconditionally issues a new token. On failure the stored credential is
    /// left exactly as it was.
    pub async fn refresh_token(&self) -> Result<()> {
        let mut credential = self.credential.write().await;
        self.refresh_locked(&mut credential).await
    }

    async fn refresh_locked(&self, credential: &mut Credential) -> Result<()> {
        let token = self.issuer.issue_token(&self.network_domain).await?;
        let expiry = Utc::now() + self.lifetime;
        *credential = Credential::new(token, expiry);

        tracing::info!(
            network_domain = %self.network_domain,
            "🔑 Token refreshed successfully, valid until {}",
            expiry
        );
        Ok(())
    }

    pub async fn snapshot(&self) -> Credential {
        self.credential.read().await.clone()
    }

    pub async fn status(&self) -> TokenStatus {
        let credential = self.credential.read().await;
        status_of(&credential, Utc::now())
    }
}

#[async_trait]
impl TokenProvider for TokenManager {
    async fn get_token(&self) -> Result<String> {
        TokenManager::get_token(self).await
    }

    async fn refresh_token(&self) -> Result<()> {
        TokenManager::refresh_token(self).await
    }

    async fn status(&self) -> TokenStatus {
        TokenManager::status(self).await
    }
}

fn status_of(credential: &Credential, now: DateTime<Utc>) -> TokenStatus {
    let token_preview = if credential.access_token.chars().count() > PREVIEW_CHARS {
        let head: String = credential.access_token.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        String::new()
    };

    let remaining = credential.expiry.map(|expiry| expiry - now);
    let is_valid = !credential.is_empty() && remaining.is_some_and(|r| r > Duration::zero());

    TokenStatus {
        status: "success".to_string(),
        token_preview,
        expiry: credential.expiry,
        is_valid,
        expires_in: format_remaining(remaining.unwrap_or_else(Duration::zero)),
    }
}

/// `23h59m58s` 形式；已過期為 `0s`
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
