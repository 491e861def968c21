pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::GatewayConfig;

pub use api::{build_router, AppState};
pub use crate::core::{content_service::ContentService, token_manager::TokenManager, upstream::UpstreamClient};
pub use utils::error::{GatewayError, Result};
