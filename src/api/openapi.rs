use super::{handlers, AppState};
use crate::domain::model::{ContentFormat, ContentRequest, ContentResult, RefreshResponse, TokenStatus};
use axum::Router;
use utoipa::openapi::server::Server;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Content Gateway API",
        version = "1.0.0",
        description = "Retrieves post content from a GraphQL content platform with automatic access-token management.",
        license(name = "MIT")
    ),
    paths(handlers::get_content, handlers::refresh_token, handlers::token_status),
    components(schemas(ContentRequest, ContentResult, ContentFormat, TokenStatus, RefreshResponse)),
    tags(
        (name = "content", description = "Post content retrieval"),
        (name = "token", description = "Upstream access-token administration (unauthenticated unless admin.require_auth is set)"),
    )
)]
pub struct ApiDoc;

/// 以設定的路由前綴作為 server URL 產生文件
pub fn build_openapi(base_path: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.servers = Some(vec![Server::new(base_path)]);
    doc
}

/// `/swagger/` 文件頁面與 `/swagger/openapi.json`
pub fn docs_router(base_path: &str) -> Router<AppState> {
    Router::new().merge(SwaggerUi::new("/swagger").url("/swagger/openapi.json", build_openapi(base_path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_all_operations() {
        let doc = build_openapi("/api/v1");
        let json = serde_json::to_value(&doc).unwrap();

        assert!(json["paths"].get("/content").is_some());
        assert!(json["paths"].get("/token/refresh").is_some());
        assert!(json["paths"].get("/token/status").is_some());
        assert_eq!(json["servers"][0]["url"], "/api/v1");
        assert!(json["components"]["schemas"].get("ContentResult").is_some());
    }
}
