//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::synthesis::{NewSynthesisJob, SynthesisJob};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Synthesis Job Ledger
// ============================================================================

/// Job Ledger Port
///
/// 每个提交的合成任务对应一条持久化记录
#[async_trait]
pub trait SynthesisJobRepositoryPort: Send + Sync {
    /// 创建任务并分配本地 ID
    async fn create(&self, job: NewSynthesisJob) -> Result<SynthesisJob, RepositoryError>;

    /// 根据本地 ID 查找
    async fn find_by_id(&self, id: i64) -> Result<Option<SynthesisJob>, RepositoryError>;

    /// 获取全部任务（按创建时间倒序）
    async fn find_all(&self) -> Result<Vec<SynthesisJob>, RepositoryError>;

    /// 保存任务的可变字段（status / output_path / error_detail）
    async fn save(&self, job: &SynthesisJob) -> Result<(), RepositoryError>;

    /// 删除任务
    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;
}

// ============================================================================
// Credential Repository
// ============================================================================

/// 服务商凭证
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: i64,
    pub platform: String,
    pub key: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    /// 脱敏后的密钥，用于日志和列表展示
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.key.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}****{}", head, tail)
    }
}

/// 新凭证
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub platform: String,
    pub key: String,
    pub is_default: bool,
}

/// Credential Repository Port
#[async_trait]
pub trait CredentialRepositoryPort: Send + Sync {
    /// 新增凭证；is_default 为 true 时取消其它凭证的默认标记
    async fn create(&self, credential: NewCredential) -> Result<Credential, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Credential>, RepositoryError>;

    /// 标记为默认的凭证
    async fn find_default(&self) -> Result<Option<Credential>, RepositoryError>;

    /// 最早登记的凭证
    async fn find_oldest(&self) -> Result<Option<Credential>, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<Credential>, RepositoryError>;

    /// 设为默认凭证
    async fn set_default(&self, id: i64) -> Result<(), RepositoryError>;

    /// 删除凭证，返回是否存在
    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_key() {
        let now = Utc::now();
        let mut credential = Credential {
            id: 1,
            platform: "minimax".to_string(),
            key: "sk-abcdefghijklmnop".to_string(),
            is_default: false,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(credential.masked_key(), "sk-a****mnop");

        credential.key = "short".to_string();
        assert_eq!(credential.masked_key(), "*****");
    }
}
