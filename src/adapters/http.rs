use crate::config::UpstreamConfig;
use crate::domain::ports::TokenIssuer;
use crate::utils::error::{GatewayError, Result, ResultExt};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlErrorItem {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlEnvelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorItem>,
}

impl<T> GraphQlEnvelope<T> {
    /// 沒有 data 但帶有 errors 時，轉成 GraphQl 錯誤
    pub fn into_data(self) -> Result<Option<T>> {
        if self.data.is_none() && !self.errors.is_empty() {
            return Err(GatewayError::GraphQl {
                messages: self.errors.into_iter().map(|e| e.message).collect(),
            });
        }
        Ok(self.data)
    }
}

/// 已讀取完的上游回應
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn parse<T: DeserializeOwned>(&self) -> Result<GraphQlEnvelope<T>> {
        Ok(serde_json::from_str(&self.body)?)
    }

    pub fn status_error(&self) -> GatewayError {
        GatewayError::UpstreamStatus {
            status: self.status.as_u16(),
            body: self.body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        }
    }
}

/// 單一 GraphQL 端點的 HTTP 傳輸層，權杖發放與內容查詢共用
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    client: Client,
    endpoint: String,
    user_agent: String,
}

impl GraphQlClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(10)))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    pub async fn post(&self, request: &GraphQlRequest<'_>, bearer: Option<&str>) -> Result<RawResponse> {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "*/*")
            .header(header::USER_AGENT, &self.user_agent)
            .json(request);

        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!("Sending GraphQL request to: {}", self.endpoint);
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("GraphQL response status: {}", status);

        Ok(RawResponse { status, body })
    }
}

#[derive(Debug, Default, Deserialize)]
struct TokensData {
    #[serde(default)]
    tokens: Option<TokensPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokensPayload {
    #[serde(default)]
    access_token: Option<String>,
}

fn token_query(network_domain: &str) -> Result<String> {
    // JSON 字串字面值與 GraphQL 字串語法相容
    let domain = serde_json::to_string(network_domain)?;
    Ok(format!(
        "query {{ tokens(networkDomain: {}) {{ accessToken }} }}",
        domain
    ))
}

#[async_trait]
impl TokenIssuer for GraphQlClient {
    async fn issue_token(&self, network_domain: &str) -> Result<String> {
        let query = token_query(network_domain).context("error marshalling token query")?;
        let request = GraphQlRequest {
            query: &query,
            variables: None,
        };

        let response = self
            .post(&request, None)
            .await
            .context("error sending token request")?;

        if response.status != StatusCode::OK {
            return Err(GatewayError::TokenRequest {
                message: format!("unexpected status {}", response.status),
            }
            .context("error requesting token"));
        }

        let envelope = response
            .parse::<TokensData>()
            .context("error parsing token response")?;

        let token = envelope
            .into_data()
            .context("token query failed")?
            .and_then(|data| data.tokens)
            .and_then(|tokens| tokens.access_token)
            .unwrap_or_default();

        if token.is_empty() {
            return Err(GatewayError::EmptyToken);
        }

        Ok(token)
    }
}
