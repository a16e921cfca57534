//! Credential Commands

/// 新增凭证命令
#[derive(Debug, Clone)]
pub struct AddCredential {
    pub platform: Option<String>,
    pub key: String,
    pub is_default: bool,
}

/// 设为默认凭证命令
#[derive(Debug, Clone)]
pub struct SetDefaultCredential {
    pub credential_id: i64,
}

/// 删除凭证命令
#[derive(Debug, Clone)]
pub struct DeleteCredential {
    pub credential_id: i64,
}
