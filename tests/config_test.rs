use anyhow::Result;
use content_gateway::utils::validation::Validate;
use content_gateway::{GatewayConfig, GatewayError};
use tempfile::TempDir;

/// 從設定檔載入並替換環境變數
#[test]
fn test_load_config_file_with_env_substitution() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("gateway.toml");

    std::env::set_var("CONTENT_GATEWAY_TEST_ADMIN_TOKEN", "from-env-secret");

    std::fs::write(
        &config_path,
        r#"
[server]
host = "127.0.0.1"
port = 9191
base_path = "/gateway"

[upstream]
endpoint = "http://localhost:4000/graphql"
network_domain = "forum.example.com"
timeout_seconds = 3

[token]
lifetime_seconds = 3600
expiry_buffer_seconds = 120

[admin]
require_auth = true
token = "${CONTENT_GATEWAY_TEST_ADMIN_TOKEN}"
"#,
    )?;

    let config = GatewayConfig::from_file(&config_path)?;
    config.validate()?;

    assert_eq!(config.bind_address(), "127.0.0.1:9191");
    assert_eq!(config.server.base_path, "/gateway");
    assert_eq!(config.upstream.endpoint, "http://localhost:4000/graphql");
    assert_eq!(config.upstream.network_domain, "forum.example.com");
    assert_eq!(config.token.lifetime_seconds, 3600);
    assert_eq!(config.admin.effective_token(), Some("from-env-secret"));

    Ok(())
}

#[test]
fn test_missing_config_file_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("absent.toml");

    let err = GatewayConfig::from_file(&missing).unwrap_err();
    assert!(matches!(err.root(), GatewayError::Io(_)));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn test_invalid_values_fail_validation() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("bad.toml");
    std::fs::write(
        &config_path,
        r#"
[upstream]
endpoint = "ftp://example.com"
"#,
    )?;

    let config = GatewayConfig::from_file(&config_path)?;
    let err = config.validate().unwrap_err();
    assert!(matches!(err, GatewayError::InvalidConfigValue { ref field, .. } if field == "upstream.endpoint"));

    Ok(())
}
