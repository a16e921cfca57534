//! Credential Queries

/// 列出全部凭证（密钥脱敏）
#[derive(Debug, Clone)]
pub struct ListCredentials;
