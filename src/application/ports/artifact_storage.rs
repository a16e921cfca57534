//! Artifact Storage Port - 出站端口
//!
//! 定义合成音频文件的存储接口

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::synthesis::AudioFormat;

/// 产物存储错误
#[derive(Debug, Error)]
pub enum ArtifactStorageError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Invalid artifact reference: {0}")]
    InvalidReference(String),
}

/// Artifact Storage Port
///
/// 路径只由任务 ID 与格式决定，重复写入会覆盖而不是累积
#[async_trait]
pub trait ArtifactStoragePort: Send + Sync {
    /// 任务产物在磁盘上的路径
    fn artifact_path(&self, job_id: i64, format: AudioFormat) -> PathBuf;

    /// 写入音频，返回稳定的引用路径（如 /files/synthesis_1.mp3）
    async fn save(
        &self,
        job_id: i64,
        format: AudioFormat,
        data: &[u8],
    ) -> Result<String, ArtifactStorageError>;

    /// 将引用路径解析为磁盘路径
    fn resolve(&self, reference: &str) -> Result<PathBuf, ArtifactStorageError>;

    /// 删除引用路径对应的文件，返回是否确实删除了文件
    async fn remove(&self, reference: &str) -> Result<bool, ArtifactStorageError>;
}
