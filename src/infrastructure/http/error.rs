//! HTTP Error Handling
//!
//! 业务错误统一以 HTTP 200 + errno 返回

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::{ApplicationError, RepositoryError};

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const NOT_FOUND: i32 = 404;
    pub const CONFLICT: i32 = 409;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const BAD_GATEWAY: i32 = 502;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
    Conflict(String),
    /// 服务商调用失败
    BadGateway(String),
    ServiceUnavailable(String),
    /// 合成失败，data 中携带已落库的任务记录
    SynthesisFailed {
        message: String,
        job: serde_json::Value,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let response = match self {
            ApiError::NotFound(msg) => {
                tracing::warn!(errno = errno::NOT_FOUND, error = %msg, "Resource not found");
                ErrorResponse::new(errno::NOT_FOUND, msg)
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(errno = errno::BAD_REQUEST, error = %msg, "Bad request");
                ErrorResponse::new(errno::BAD_REQUEST, msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!(errno = errno::INTERNAL_ERROR, error = %msg, "Internal server error");
                ErrorResponse::new(errno::INTERNAL_ERROR, msg)
            }
            ApiError::Conflict(msg) => {
                tracing::warn!(errno = errno::CONFLICT, error = %msg, "Resource conflict");
                ErrorResponse::new(errno::CONFLICT, msg)
            }
            ApiError::BadGateway(msg) => {
                tracing::error!(errno = errno::BAD_GATEWAY, error = %msg, "Provider call failed");
                ErrorResponse::new(errno::BAD_GATEWAY, msg)
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::error!(errno = errno::SERVICE_UNAVAILABLE, error = %msg, "Service unavailable");
                ErrorResponse::new(errno::SERVICE_UNAVAILABLE, msg)
            }
            ApiError::SynthesisFailed { message, job } => {
                tracing::warn!(errno = errno::BAD_GATEWAY, error = %message, "Synthesis failed");
                ErrorResponse::new(errno::BAD_GATEWAY, message).with_data(job)
            }
        };

        (StatusCode::OK, Json(response)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(msg) => ApiError::NotFound(msg),
            RepositoryError::Duplicate(msg) => ApiError::Conflict(msg),
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound { resource_type, id } => {
                ApiError::NotFound(format!("{} not found: {}", resource_type, id))
            }
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::CredentialError(msg) => ApiError::BadRequest(msg),
            ApplicationError::InvalidOperation(msg) => ApiError::BadRequest(msg),
            ApplicationError::RemoteProviderError(msg) => ApiError::BadGateway(msg),
            ApplicationError::RetrievalError(msg) => ApiError::BadGateway(msg),
            ApplicationError::RepositoryError(msg) => ApiError::Internal(msg),
            ApplicationError::StorageError(msg) => ApiError::Internal(msg),
            ApplicationError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(error: ApiError) -> serde_json::Value {
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_application_errors_map_to_errno() {
        let body = body_json(ApplicationError::not_found("Task", 9).into()).await;
        assert_eq!(body["errno"], errno::NOT_FOUND);
        assert_eq!(body["error"], "Task not found: 9");
        assert!(body["data"].is_null());

        let body = body_json(ApplicationError::credential("No API Key available").into()).await;
        assert_eq!(body["errno"], errno::BAD_REQUEST);

        let body =
            body_json(ApplicationError::RemoteProviderError("Query Failed".to_string()).into()).await;
        assert_eq!(body["errno"], errno::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_synthesis_failure_carries_record() {
        let body = body_json(ApiError::SynthesisFailed {
            message: "Async Submit Failed: boom".to_string(),
            job: serde_json::json!({"id": 3, "status": "failed"}),
        })
        .await;
        assert_eq!(body["errno"], errno::BAD_GATEWAY);
        assert_eq!(body["data"]["id"], 3);
        assert_eq!(body["data"]["status"], "failed");
    }
}
