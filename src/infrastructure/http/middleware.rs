//! HTTP Middleware
//!
//! 按响应状态与耗时记录访问日志

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use std::time::{Duration, Instant};

/// 慢请求阈值，状态检查会同步等待音频下载
pub const SLOW_REQUEST: Duration = Duration::from_secs(5);

/// 一次请求在日志中的归类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    ServerError,
    ClientError,
    /// 状态正常但超过 SLOW_REQUEST
    Slow,
    Normal,
}

impl RequestClass {
    /// 状态码优先于耗时
    pub fn classify(status: StatusCode, elapsed: Duration) -> Self {
        if status.is_server_error() {
            RequestClass::ServerError
        } else if status.is_client_error() {
            RequestClass::ClientError
        } else if elapsed >= SLOW_REQUEST {
            RequestClass::Slow
        } else {
            RequestClass::Normal
        }
    }
}

/// 访问日志中间件
///
/// 业务错误（errno != 0）走 HTTP 200，由 ApiError::into_response() 记录；
/// 这里只处理传输层状态码与慢请求
pub async fn access_log_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed = started.elapsed();
    let elapsed_ms = elapsed.as_millis() as u64;

    match RequestClass::classify(status, elapsed) {
        RequestClass::ServerError => tracing::error!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms,
            "Request failed"
        ),
        RequestClass::ClientError => tracing::warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms,
            "Request rejected"
        ),
        RequestClass::Slow => tracing::warn!(
            method = %method,
            path = %path,
            elapsed_ms,
            "Slow request"
        ),
        RequestClass::Normal => tracing::debug!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms,
            "Request served"
        ),
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request as HttpRequest, routing::get, Router};
    use tower::util::ServiceExt;

    #[test]
    fn test_status_outranks_latency() {
        let slow = SLOW_REQUEST + Duration::from_millis(1);

        assert_eq!(
            RequestClass::classify(StatusCode::BAD_GATEWAY, slow),
            RequestClass::ServerError
        );
        assert_eq!(
            RequestClass::classify(StatusCode::NOT_FOUND, slow),
            RequestClass::ClientError
        );
        assert_eq!(
            RequestClass::classify(StatusCode::OK, slow),
            RequestClass::Slow
        );
    }

    #[test]
    fn test_slow_threshold_is_inclusive() {
        assert_eq!(
            RequestClass::classify(StatusCode::OK, SLOW_REQUEST),
            RequestClass::Slow
        );
        assert_eq!(
            RequestClass::classify(StatusCode::OK, SLOW_REQUEST - Duration::from_millis(1)),
            RequestClass::Normal
        );
        // 重定向不算错误
        assert_eq!(
            RequestClass::classify(StatusCode::NOT_MODIFIED, Duration::ZERO),
            RequestClass::Normal
        );
    }

    #[tokio::test]
    async fn test_responses_pass_through_unchanged() {
        let router = Router::new()
            .route("/ok", get(|| async { "OK" }))
            .route("/gone", get(|| async { StatusCode::GONE }))
            .layer(axum::middleware::from_fn(access_log_middleware));

        for (uri, expected) in [
            ("/ok", StatusCode::OK),
            ("/gone", StatusCode::GONE),
            ("/missing", StatusCode::NOT_FOUND),
        ] {
            let request = HttpRequest::builder().uri(uri).body(Body::empty()).unwrap();
            let response = router.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), expected);
        }
    }
}
