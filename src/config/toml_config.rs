use crate::utils::error::{GatewayError, Result};
use crate::utils::validation::{
    validate_base_path, validate_non_empty_string, validate_positive_number, validate_range,
    validate_required_field, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_UPSTREAM_ENDPOINT: &str = "https://api.bettermode.com/";
pub const DEFAULT_NETWORK_DOMAIN: &str = "www.gpters.org";
pub const DEFAULT_USER_AGENT: &str = "GPTers-Scraper/1.0";
/// 無法從權杖本身得知真正到期時間時使用的壽命
pub const DEFAULT_TOKEN_LIFETIME_SECONDS: u64 = 24 * 60 * 60;
pub const DEFAULT_EXPIRY_BUFFER_SECONDS: u64 = 5 * 60;
/// 權杖壽命與緩衝的上限：一年
pub const MAX_TOKEN_SECONDS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub token: TokenConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_path: String,
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            base_path: "/api/v1".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub endpoint: String,
    pub network_domain: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_UPSTREAM_ENDPOINT.to_string(),
            network_domain: DEFAULT_NETWORK_DOMAIN.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub lifetime_seconds: u64,
    pub expiry_buffer_seconds: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            lifetime_seconds: DEFAULT_TOKEN_LIFETIME_SECONDS,
            expiry_buffer_seconds: DEFAULT_EXPIRY_BUFFER_SECONDS,
        }
    }
}

/// `/token/*` 管理端點的存取控制；預設不驗證
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub require_auth: bool,
    pub token: Option<String>,
}

impl AdminConfig {
    /// 啟用驗證時才回傳管理權杖
    pub fn effective_token(&self) -> Option<&str> {
        if self.require_auth {
            self.token.as_deref().filter(|t| !t.is_empty())
        } else {
            None
        }
    }
}

impl GatewayConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            GatewayError::Io(e).context(format!("cannot read {}", path.as_ref().display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| GatewayError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 預設值 → 可選的設定檔 → 環境變數
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// 替換環境變數 (例如 ${ADMIN_TOKEN})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GatewayError::Config {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// `PORT` 覆寫設定檔中的埠號
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").filter(|p| !p.is_empty()) {
            self.server.port = port
                .parse()
                .map_err(|_| GatewayError::InvalidConfigValue {
                    field: "PORT".to_string(),
                    value: port.clone(),
                    reason: "must be a port number".to_string(),
                })?;
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Validate for GatewayConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.server.host)?;
        validate_range("server.port", self.server.port, 1, u16::MAX)?;
        validate_base_path("server.base_path", &self.server.base_path)?;
        validate_positive_number(
            "server.request_timeout_seconds",
            self.server.request_timeout_seconds,
            1,
        )?;

        validate_url("upstream.endpoint", &self.upstream.endpoint)?;
        validate_non_empty_string("upstream.network_domain", &self.upstream.network_domain)?;
        validate_non_empty_string("upstream.user_agent", &self.upstream.user_agent)?;
        validate_positive_number("upstream.timeout_seconds", self.upstream.timeout_seconds, 1)?;

        validate_range("token.lifetime_seconds", self.token.lifetime_seconds, 1, MAX_TOKEN_SECONDS)?;
        validate_range(
            "token.expiry_buffer_seconds",
            self.token.expiry_buffer_seconds,
            0,
            MAX_TOKEN_SECONDS,
        )?;
        if self.token.lifetime_seconds <= self.token.expiry_buffer_seconds {
            return Err(GatewayError::InvalidConfigValue {
                field: "token.lifetime_seconds".to_string(),
                value: self.token.lifetime_seconds.to_string(),
                reason: format!(
                    "must exceed token.expiry_buffer_seconds ({})",
                    self.token.expiry_buffer_seconds
                ),
            });
        }

        if self.admin.require_auth {
            let token = validate_required_field("admin.token", &self.admin.token)?;
            validate_non_empty_string("admin.token", token)?;
        }

        tracing::debug!("✅ Gateway configuration validation passed");
        Ok(())
    }
}
