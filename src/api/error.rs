use crate::utils::error::GatewayError;
use axum::http::header;
use axum::response::{IntoResponse, Response};

/// 錯誤一律轉成純文字訊息加上 HTTP 狀態碼
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            GatewayError::Validation { message } | GatewayError::Unauthorized { message } => {
                message.clone()
            }
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "❌ {}", message);
        } else {
            tracing::debug!(status = status.as_u16(), "Rejected request: {}", message);
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{}\n", message),
        )
            .into_response()
    }
}
