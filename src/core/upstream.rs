use crate::adapters::http::{GraphQlClient, GraphQlRequest, RawResponse};
use crate::domain::model::{FetchedPost, MappingField};
use crate::domain::ports::{ContentSource, TokenProvider};
use crate::utils::error::{GatewayError, Result, ResultExt};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;

const POST_QUERY: &str = r#"query GetPost($id: ID!) {
    post(id: $id) {
        mappingFields {
            key
            type
            value
        }
        title
    }
}"#;

const CONTENT_KEY: &str = "content";

/// 401 之後最多重試一次
const MAX_AUTH_RETRIES: usize = 1;

#[derive(Debug, Deserialize)]
struct PostData {
    post: Option<PostPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostPayload {
    #[serde(default)]
    mapping_fields: Vec<MappingField>,
    #[serde(default)]
    title: Option<String>,
}

/// 以目前權杖查詢貼文內容；遇到 401 時強制刷新權杖並重試一次
pub struct UpstreamClient {
    graphql: GraphQlClient,
    tokens: Arc<dyn TokenProvider>,
}

impl UpstreamClient {
    pub fn new(graphql: GraphQlClient, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { graphql, tokens }
    }

    pub async fn fetch_content(&self, post_id: &str) -> Result<FetchedPost> {
        let request = GraphQlRequest {
            query: POST_QUERY,
            variables: Some(serde_json::json!({ "id": post_id })),
        };

        let mut retries = 0;
        loop {
            let token = self
                .tokens
                .get_token()
                .await
                .context("error getting access token")?;

            let response = self
                .graphql
                .post(&request, Some(&token))
                .await
                .context("error sending request")?;

            if response.status != StatusCode::UNAUTHORIZED {
                return parse_post(post_id, &response);
            }

            if retries >= MAX_AUTH_RETRIES {
                tracing::error!(post_id, "❌ Upstream rejected the refreshed token");
                return Err(GatewayError::UpstreamUnauthorized);
            }
            retries += 1;

            tracing::warn!(post_id, "🔄 Token seems expired, refreshing and retrying...");
            self.tokens
                .refresh_token()
                .await
                .context("failed to refresh token")?;
        }
    }
}

#[async_trait]
impl ContentSource for UpstreamClient {
    async fn fetch_content(&self, post_id: &str) -> Result<FetchedPost> {
        UpstreamClient::fetch_content(self, post_id).await
    }
}

fn parse_post(post_id: &str, response: &RawResponse) -> Result<FetchedPost> {
    if !response.status.is_success() {
        return Err(response.status_error());
    }

    let envelope = response
        .parse::<PostData>()
        .context("error parsing response")?;
    let post = envelope
        .into_data()
        .context("post query failed")?
        .and_then(|data| data.post);

    let Some(post) = post else {
        return Err(GatewayError::ContentFieldMissing {
            post_id: post_id.to_string(),
            title: None,
        });
    };

    let title = post.title.filter(|t| !t.is_empty());
    let content = post
        .mapping_fields
        .into_iter()
        .find(|field| field.key == CONTENT_KEY)
        .map(|field| field.value)
        .unwrap_or_default();

    if content.is_empty() {
        return Err(GatewayError::ContentFieldMissing {
            post_id: post_id.to_string(),
            title,
        });
    }

    Ok(FetchedPost { content, title })
}
