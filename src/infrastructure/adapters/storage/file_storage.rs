//! File Storage - 文件系统产物存储实现
//!
//! 实现 ArtifactStoragePort trait

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{ArtifactStorageError, ArtifactStoragePort};
use crate::domain::synthesis::AudioFormat;

/// 文件系统产物存储
///
/// 文件名为 synthesis_<job_id>.<ext>，对外引用为 <public_prefix>/<文件名>
pub struct FileArtifactStorage {
    /// 存储根目录
    base_dir: PathBuf,
    /// 对外暴露的 URL 前缀
    public_prefix: String,
}

impl FileArtifactStorage {
    /// 创建新的文件存储
    pub async fn new(
        base_dir: impl AsRef<Path>,
        public_prefix: impl Into<String>,
    ) -> Result<Self, ArtifactStorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        // 确保目录存在
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| ArtifactStorageError::IoError(e.to_string()))?;

        let public_prefix = public_prefix.into().trim_end_matches('/').to_string();

        Ok(Self {
            base_dir,
            public_prefix,
        })
    }

    /// 获取存储根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    fn file_name(job_id: i64, format: AudioFormat) -> String {
        format!("synthesis_{}.{}", job_id, format.extension())
    }
}

#[async_trait]
impl ArtifactStoragePort for FileArtifactStorage {
    fn artifact_path(&self, job_id: i64, format: AudioFormat) -> PathBuf {
        self.base_dir.join(Self::file_name(job_id, format))
    }

    async fn save(
        &self,
        job_id: i64,
        format: AudioFormat,
        data: &[u8],
    ) -> Result<String, ArtifactStorageError> {
        let path = self.artifact_path(job_id, format);

        // 先写临时文件再改名，读者不会看到写了一半的文件
        let tmp_path = path.with_extension("part");
        fs::write(&tmp_path, data)
            .await
            .map_err(|e| ArtifactStorageError::IoError(e.to_string()))?;
        fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| ArtifactStorageError::IoError(e.to_string()))?;

        tracing::debug!(
            job_id = job_id,
            path = %path.display(),
            size = data.len(),
            "Saved synthesis artifact"
        );

        Ok(format!(
            "{}/{}",
            self.public_prefix,
            Self::file_name(job_id, format)
        ))
    }

    fn resolve(&self, reference: &str) -> Result<PathBuf, ArtifactStorageError> {
        let name = reference
            .strip_prefix(&self.public_prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| ArtifactStorageError::InvalidReference(reference.to_string()))?;

        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(ArtifactStorageError::InvalidReference(reference.to_string()));
        }

        Ok(self.base_dir.join(name))
    }

    async fn remove(&self, reference: &str) -> Result<bool, ArtifactStorageError> {
        let path = self.resolve(reference)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Deleted synthesis artifact");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ArtifactStorageError::IoError(e.to_string())),
        }
    }
}
