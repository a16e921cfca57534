//! Credential resolution shared by the synthesis handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{Credential, CredentialRepositoryPort};

/// 显式凭证不存在时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownCredentialPolicy {
    /// 直接报错（提交任务）
    Reject,
    /// 回退到默认/最早凭证（状态查询的兼容行为）
    Fallback,
}

/// 凭证解析：显式 ID -> 默认凭证 -> 最早登记的凭证
#[derive(Clone)]
pub struct CredentialResolver {
    credential_repo: Arc<dyn CredentialRepositoryPort>,
}

impl CredentialResolver {
    pub fn new(credential_repo: Arc<dyn CredentialRepositoryPort>) -> Self {
        Self { credential_repo }
    }

    pub async fn resolve(
        &self,
        explicit: Option<i64>,
        policy: UnknownCredentialPolicy,
    ) -> Result<Credential, ApplicationError> {
        if let Some(id) = explicit.filter(|id| *id > 0) {
            if let Some(credential) = self.credential_repo.find_by_id(id).await? {
                return Ok(credential);
            }
            if policy == UnknownCredentialPolicy::Reject {
                return Err(ApplicationError::credential(format!(
                    "Invalid API Key ID: {}",
                    id
                )));
            }
            tracing::warn!(key_id = id, "Unknown API key, falling back to default key");
        }

        if let Some(credential) = self.credential_repo.find_default().await? {
            return Ok(credential);
        }

        self.credential_repo
            .find_oldest()
            .await?
            .ok_or_else(|| ApplicationError::credential("No API Key available"))
    }
}
