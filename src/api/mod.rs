//! HTTP surface: routing, middleware and server lifecycle.

pub mod admin;
pub mod error;
pub mod handlers;
pub mod openapi;

use crate::adapters::GraphQlClient;
use crate::config::{GatewayConfig, ServerConfig};
use crate::core::content_service::ContentService;
use crate::core::token_manager::TokenManager;
use crate::core::upstream::UpstreamClient;
use crate::domain::ports::TokenProvider;
use crate::utils::error::Result;
use axum::http::{header, Method, StatusCode};
use axum::routing::{get, post};
use axum::{middleware, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub content: Arc<ContentService>,
    pub tokens: Arc<dyn TokenProvider>,
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(content: Arc<ContentService>, tokens: Arc<dyn TokenProvider>, admin_token: Option<&str>) -> Self {
        Self {
            content,
            tokens,
            admin_token: admin_token.map(Arc::from),
        }
    }

    /// 組裝正式環境的元件：GraphQL 客戶端、權杖管理器、上游客戶端
    pub fn from_config(config: &GatewayConfig) -> Result<(Self, Arc<TokenManager>)> {
        let graphql = GraphQlClient::new(&config.upstream)?;
        let token_manager = Arc::new(TokenManager::new(
            Arc::new(graphql.clone()),
            config.upstream.network_domain.clone(),
            &config.token,
        )?);
        let upstream = Arc::new(UpstreamClient::new(graphql, token_manager.clone()));
        let content = Arc::new(ContentService::new(upstream));

        let state = Self::new(content, token_manager.clone(), config.admin.effective_token());
        Ok((state, token_manager))
    }
}

pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let admin_routes = Router::new()
        .route("/token/refresh", get(handlers::refresh_token))
        .route("/token/status", get(handlers::token_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin::require_admin));

    let api = Router::new()
        .route("/content", post(handlers::get_content))
        .merge(admin_routes);

    let api = if config.base_path == "/" {
        api
    } else {
        Router::new().nest(&config.base_path, api)
    };

    Router::new()
        .merge(api)
        .route("/health", get(handlers::health))
        .merge(openapi::docs_router(&config.base_path))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            Duration::from_secs(config.request_timeout_seconds),
        ))
        .layer(build_cors_layer())
        .layer(TraceLayer::new_for_http().make_span_with(
            |req: &axum::http::Request<axum::body::Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                )
            },
        ))
        .layer(CatchPanicLayer::new())
}

fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::LINK])
        .max_age(Duration::from_secs(300))
}

/// 綁定位址並服務，直到收到 Ctrl-C 或 SIGTERM
pub async fn serve(router: Router, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🚀 Server starting on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received, draining connections");
}
