//! Credential Query Handlers

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{Credential, CredentialRepositoryPort};
use crate::application::queries::ListCredentials;

/// 凭证摘要，不含明文密钥
#[derive(Debug, Clone)]
pub struct CredentialSummary {
    pub id: i64,
    pub platform: String,
    pub masked_key: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Credential> for CredentialSummary {
    fn from(credential: Credential) -> Self {
        Self {
            masked_key: credential.masked_key(),
            id: credential.id,
            platform: credential.platform,
            is_default: credential.is_default,
            created_at: credential.created_at,
        }
    }
}

/// ListCredentials Handler
pub struct ListCredentialsHandler {
    credential_repo: Arc<dyn CredentialRepositoryPort>,
}

impl ListCredentialsHandler {
    pub fn new(credential_repo: Arc<dyn CredentialRepositoryPort>) -> Self {
        Self { credential_repo }
    }

    pub async fn handle(
        &self,
        _query: ListCredentials,
    ) -> Result<Vec<CredentialSummary>, ApplicationError> {
        let credentials = self.credential_repo.find_all().await?;
        Ok(credentials.into_iter().map(CredentialSummary::from).collect())
    }
}
