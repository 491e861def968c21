use super::GatewayConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "content-gateway")]
#[command(about = "HTTP gateway that serves post content from a GraphQL content platform")]
pub struct CliArgs {
    #[arg(long, short, env = "CONTENT_GATEWAY_CONFIG", help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long, help = "Listen port (overrides PORT and the config file)")]
    pub port: Option<u16>,

    #[arg(long)]
    pub upstream_endpoint: Option<String>,

    #[arg(long)]
    pub network_domain: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliArgs {
    /// 命令列參數優先於設定檔與環境變數
    pub fn apply(&self, config: &mut GatewayConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(endpoint) = &self.upstream_endpoint {
            config.upstream.endpoint = endpoint.clone();
        }
        if let Some(domain) = &self.network_domain {
            config.upstream.network_domain = domain.clone();
        }
    }
}
