use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<GatewayError>,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Token request failed: {message}")]
    TokenRequest { message: String },

    #[error("no token returned from API")]
    EmptyToken,

    #[error("upstream returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("upstream rejected the access token after a refresh")]
    UpstreamUnauthorized,

    #[error("GraphQL errors: {}", messages.join("; "))]
    GraphQl { messages: Vec<String> },

    #[error(
        "content field not found for post {post_id}{}",
        title.as_deref().map(|t| format!(" (title: {})", t)).unwrap_or_default()
    )]
    ContentFieldMissing {
        post_id: String,
        title: Option<String>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, GatewayError>;

impl GatewayError {
    /// 以描述失敗步驟的上下文包裝錯誤
    pub fn context(self, context: impl Into<String>) -> Self {
        GatewayError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        GatewayError::Validation {
            message: message.into(),
        }
    }

    /// 最內層的錯誤（略過所有 Context 包裝）
    pub fn root(&self) -> &GatewayError {
        match self {
            GatewayError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// 即使內容欄位缺失，標題仍可獨立解析
    pub fn title(&self) -> Option<&str> {
        match self.root() {
            GatewayError::ContentFieldMissing { title, .. } => title.as_deref(),
            _ => None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.root() {
            GatewayError::Validation { .. } => StatusCode::BAD_REQUEST,
            GatewayError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// 為 `Result` 提供 `.context(...)`，和 anyhow 的用法一致
pub trait ResultExt<T> {
    fn context(self, context: &str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<GatewayError>,
{
    fn context(self, context: &str) -> Result<T> {
        self.map_err(|e| e.into().context(context))
    }
}
