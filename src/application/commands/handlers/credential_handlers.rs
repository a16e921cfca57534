//! Credential Command Handlers

use std::sync::Arc;

use crate::application::commands::{AddCredential, DeleteCredential, SetDefaultCredential};
use crate::application::error::ApplicationError;
use crate::application::ports::{Credential, CredentialRepositoryPort, NewCredential};

/// 未指定平台时登记的平台名
pub const DEFAULT_PLATFORM: &str = "minimax";

// ============================================================================
// AddCredential
// ============================================================================

/// AddCredential Handler
pub struct AddCredentialHandler {
    credential_repo: Arc<dyn CredentialRepositoryPort>,
}

impl AddCredentialHandler {
    pub fn new(credential_repo: Arc<dyn CredentialRepositoryPort>) -> Self {
        Self { credential_repo }
    }

    pub async fn handle(&self, command: AddCredential) -> Result<Credential, ApplicationError> {
        let key = command.key.trim().to_string();
        if key.is_empty() {
            return Err(ApplicationError::validation("API key must not be empty"));
        }

        let platform = command
            .platform
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PLATFORM.to_string());

        let credential = self
            .credential_repo
            .create(NewCredential {
                platform,
                key,
                is_default: command.is_default,
            })
            .await?;

        tracing::info!(
            key_id = credential.id,
            platform = %credential.platform,
            key = %credential.masked_key(),
            is_default = credential.is_default,
            "API key added"
        );

        Ok(credential)
    }
}

// ============================================================================
// SetDefaultCredential
// ============================================================================

/// SetDefaultCredential Handler
pub struct SetDefaultCredentialHandler {
    credential_repo: Arc<dyn CredentialRepositoryPort>,
}

impl SetDefaultCredentialHandler {
    pub fn new(credential_repo: Arc<dyn CredentialRepositoryPort>) -> Self {
        Self { credential_repo }
    }

    pub async fn handle(&self, command: SetDefaultCredential) -> Result<(), ApplicationError> {
        let id = command.credential_id;

        self.credential_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("API Key", id))?;

        self.credential_repo.set_default(id).await?;

        tracing::info!(key_id = id, "Default API key changed");

        Ok(())
    }
}

// ============================================================================
// DeleteCredential
// ============================================================================

/// DeleteCredential Handler
///
/// 删除默认凭证后不自动指定新的默认值，解析时回退到最早登记的凭证
pub struct DeleteCredentialHandler {
    credential_repo: Arc<dyn CredentialRepositoryPort>,
}

impl DeleteCredentialHandler {
    pub fn new(credential_repo: Arc<dyn CredentialRepositoryPort>) -> Self {
        Self { credential_repo }
    }

    pub async fn handle(&self, command: DeleteCredential) -> Result<(), ApplicationError> {
        let id = command.credential_id;

        if !self.credential_repo.delete(id).await? {
            return Err(ApplicationError::not_found("API Key", id));
        }

        tracing::info!(key_id = id, "API key deleted");

        Ok(())
    }
}
