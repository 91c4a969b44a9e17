//! 前端统一错误类型
//!
//! 页面只关心 `Display` 给出的提示文案；`error_code()` 用于日志。

use crate::request::TransportError;
use crmdesk_shared::SchemaError;
use serde::Deserialize;
use validator::ValidationErrors;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// 提交前的本地校验失败，没有发出请求
    #[error("{0}")]
    Validation(String),

    /// 401 / 403，或本地没有可用会话
    #[error("{message}")]
    Unauthorized { status: u16, message: String },

    /// 其他非 2xx 响应，文案来自服务端或通用兜底
    #[error("{message}")]
    Server { status: u16, message: String },

    /// 没有拿到任何响应
    #[error("Network error")]
    Network { detail: String },

    /// 响应能到达但内容不可用
    #[error("Unexpected response from server")]
    InvalidResponse(String),

    #[error("Session expired")]
    SessionExpired,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiError {
    /// 由非 2xx 响应构造：优先使用服务端 `message`，否则使用 `fallback`
    pub fn from_response(status: u16, body: &str, fallback: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());

        match status {
            401 | 403 => ApiError::Unauthorized { status, message },
            _ => ApiError::Server { status, message },
        }
    }

    pub fn from_validation(errors: &ValidationErrors) -> Self {
        ApiError::Validation(crmdesk_shared::form::first_message(errors))
    }

    pub fn not_authenticated() -> Self {
        ApiError::Unauthorized {
            status: 401,
            message: "Not authenticated".to_string(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status, .. } | ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_FAILED",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::Server { .. } => "SERVER_ERROR",
            ApiError::Network { .. } => "NETWORK_ERROR",
            ApiError::InvalidResponse(_) => "INVALID_RESPONSE",
            ApiError::SessionExpired => "SESSION_EXPIRED",
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. } | ApiError::SessionExpired)
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::Network {
            detail: err.to_string(),
        }
    }
}

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        ApiError::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_wins() {
        let err = ApiError::from_response(400, r#"{"message":"Email already exists"}"#, "API request failed");
        assert_eq!(err.to_string(), "Email already exists");
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(err.error_code(), "SERVER_ERROR");
    }

    #[test]
    fn test_fallback_when_body_has_no_message() {
        let err = ApiError::from_response(500, "<html>oops</html>", "API request failed");
        assert_eq!(err.to_string(), "API request failed");

        let err = ApiError::from_response(401, r#"{"message":""}"#, "Login failed");
        assert_eq!(err.to_string(), "Login failed");
        assert!(err.is_auth_failure());
    }

    #[test]
    fn test_network_error_is_generic() {
        let err = ApiError::from(TransportError::Network("TypeError: Failed to fetch".into()));
        assert_eq!(err.to_string(), "Network error");
        assert_eq!(err.error_code(), "NETWORK_ERROR");
    }
}
