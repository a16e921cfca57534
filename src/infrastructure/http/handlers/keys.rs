//! API Key HTTP Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::application::{
    AddCredential, CredentialSummary, DeleteCredential, ListCredentials, SetDefaultCredential,
};
use crate::infrastructure::http::dto::{AddKeyRequest, ApiResponse, Empty, KeyResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 列出 API Key（脱敏）
pub async fn list_keys(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<KeyResponse>>>, ApiError> {
    let keys = state.list_credentials_handler.handle(ListCredentials).await?;
    Ok(Json(ApiResponse::success(
        keys.into_iter().map(KeyResponse::from).collect(),
    )))
}

/// 新增 API Key
pub async fn add_key(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddKeyRequest>,
) -> Result<Json<ApiResponse<KeyResponse>>, ApiError> {
    let credential = state
        .add_credential_handler
        .handle(AddCredential {
            platform: req.platform,
            key: req.key,
            is_default: req.is_default,
        })
        .await?;

    Ok(Json(ApiResponse::success(KeyResponse::from(
        CredentialSummary::from(credential),
    ))))
}

/// 设为默认 Key
pub async fn set_default_key(
    State(state): State<Arc<AppState>>,
    Path(key_id): Path<i64>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .set_default_credential_handler
        .handle(SetDefaultCredential {
            credential_id: key_id,
        })
        .await?;
    Ok(Json(ApiResponse::ok()))
}

/// 删除 API Key
pub async fn delete_key(
    State(state): State<Arc<AppState>>,
    Path(key_id): Path<i64>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .delete_credential_handler
        .handle(DeleteCredential {
            credential_id: key_id,
        })
        .await?;
    Ok(Json(ApiResponse::ok()))
}
