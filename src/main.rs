use clap::Parser;
use content_gateway::utils::{logger, validation::Validate};
use content_gateway::{api, AppState, CliArgs, GatewayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    logger::init_logger(args.verbose, args.json_logs);
    tracing::info!("Starting content-gateway");

    // 預設值 → 設定檔 → PORT → 命令列
    let mut config = GatewayConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    if args.verbose {
        tracing::debug!("Effective configuration: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    if config.admin.effective_token().is_none() {
        tracing::warn!(
            "⚠️ /token/refresh and /token/status are unauthenticated; set admin.require_auth to protect them"
        );
    }

    let (state, token_manager) = AppState::from_config(&config)?;
    tracing::info!(
        endpoint = %config.upstream.endpoint,
        network_domain = %token_manager.network_domain(),
        "Upstream configured"
    );

    // 上游無法連線時不阻止啟動
    token_manager.initialize().await;

    let router = api::build_router(state, &config.server);
    api::serve(router, &config.bind_address()).await
}
