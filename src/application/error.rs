//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{ArtifactStorageError, ProviderError, RepositoryError};
use crate::domain::synthesis::SynthesisError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: i64,
    },

    /// 输入不完整或格式错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 没有可用凭证
    #[error("Credential error: {0}")]
    CredentialError(String),

    /// 对当前任务不允许的操作（如对同步任务查询状态）
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// 服务商拒绝或调用失败
    #[error("Remote provider error: {0}")]
    RemoteProviderError(String),

    /// 下载产物失败或 multipart 格式错误
    #[error("Retrieval error: {0}")]
    RetrievalError(String),

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: i64) -> Self {
        Self::NotFound { resource_type, id }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建凭证错误
    pub fn credential(message: impl Into<String>) -> Self {
        Self::CredentialError(message.into())
    }

    /// 创建非法操作错误
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// 创建下载错误
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::RetrievalError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        Self::RepositoryError(err.to_string())
    }
}

impl From<ProviderError> for ApplicationError {
    fn from(err: ProviderError) -> Self {
        Self::RemoteProviderError(err.to_string())
    }
}

impl From<ArtifactStorageError> for ApplicationError {
    fn from(err: ArtifactStorageError) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<SynthesisError> for ApplicationError {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::EmptyInput | SynthesisError::InvalidParameter(_) => {
                Self::ValidationError(err.to_string())
            }
            SynthesisError::TerminalState(_) => Self::InvalidOperation(err.to_string()),
        }
    }
}
