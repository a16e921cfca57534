//! Artifact retrieval - 取回远程合成产物并落盘
//!
//! 服务商的下载响应可能是单一二进制 body，也可能是 multipart body
//! （第一个 part 为音频）。这里根据 Content-Type 判断并只保留音频部分。

use std::sync::Arc;
use thiserror::Error;

use crate::application::error::ApplicationError;
use crate::application::ports::{ArtifactStoragePort, DownloadedPayload, SynthesisProviderPort};
use crate::domain::synthesis::SynthesisJob;

/// 下载响应解析错误
#[derive(Debug, Error, PartialEq)]
pub enum PayloadError {
    #[error("malformed content type: {0}")]
    MalformedContentType(String),

    #[error("multipart response without boundary")]
    MissingBoundary,

    #[error("malformed multipart body: {0}")]
    Multipart(String),

    #[error("multipart response contains no parts")]
    NoParts,

    #[error("empty audio payload")]
    Empty,
}

/// 从下载响应中提取音频字节
pub async fn extract_audio(payload: DownloadedPayload) -> Result<Vec<u8>, PayloadError> {
    let DownloadedPayload { content_type, body } = payload;

    let boundary = match content_type.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => multipart_boundary(raw)?,
        _ => None,
    };

    let audio = match boundary {
        Some(boundary) => first_part(body, boundary).await?,
        None => body,
    };

    if audio.is_empty() {
        return Err(PayloadError::Empty);
    }
    Ok(audio)
}

/// multipart 时返回 boundary，其它类型返回 None
fn multipart_boundary(content_type: &str) -> Result<Option<String>, PayloadError> {
    let parsed = match content_type.parse::<mime::Mime>() {
        Ok(parsed) => parsed,
        Err(e) => {
            if content_type.to_ascii_lowercase().starts_with("multipart/") {
                return Err(PayloadError::MalformedContentType(e.to_string()));
            }
            return Ok(None);
        }
    };

    if parsed.type_() != mime::MULTIPART {
        return Ok(None);
    }

    parsed
        .get_param(mime::BOUNDARY)
        .map(|b| Some(b.as_str().to_string()))
        .ok_or(PayloadError::MissingBoundary)
}

async fn first_part(body: Vec<u8>, boundary: String) -> Result<Vec<u8>, PayloadError> {
    let stream = futures_util::stream::once(async move { Ok::<Vec<u8>, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let field = multipart
        .next_field()
        .await
        .map_err(|e| PayloadError::Multipart(e.to_string()))?
        .ok_or(PayloadError::NoParts)?;

    tracing::debug!(
        part_name = ?field.name(),
        part_content_type = ?field.content_type().map(|m| m.to_string()),
        "Extracting first multipart part"
    );

    let bytes = field
        .bytes()
        .await
        .map_err(|e| PayloadError::Multipart(e.to_string()))?;

    Ok(bytes.to_vec())
}

/// 产物取回：文件元数据 -> 下载 -> 解析 -> 写入存储
///
/// 任一步失败都返回 RetrievalError，且不会修改任务的 output_path
pub struct ArtifactRetriever {
    storage: Arc<dyn ArtifactStoragePort>,
}

impl ArtifactRetriever {
    pub fn new(storage: Arc<dyn ArtifactStoragePort>) -> Self {
        Self { storage }
    }

    pub async fn retrieve(
        &self,
        provider: &dyn SynthesisProviderPort,
        job: &SynthesisJob,
        file_id: i64,
    ) -> Result<String, ApplicationError> {
        let file = provider
            .retrieve_file(file_id)
            .await
            .map_err(|e| ApplicationError::retrieval(format!("Retrieve failed: {}", e)))?;

        tracing::debug!(
            job_id = job.id(),
            file_id = file.file_id,
            "Downloading synthesis artifact"
        );

        let payload = provider
            .download(&file.download_url)
            .await
            .map_err(|e| ApplicationError::retrieval(format!("Download failed: {}", e)))?;

        let audio = extract_audio(payload)
            .await
            .map_err(|e| ApplicationError::retrieval(format!("Download failed: {}", e)))?;

        let reference = self
            .storage
            .save(job.id(), job.params().format, &audio)
            .await
            .map_err(|e| ApplicationError::retrieval(format!("Save failed: {}", e)))?;

        tracing::info!(
            job_id = job.id(),
            file_id = file_id,
            size = audio.len(),
            output = %reference,
            "Synthesis artifact stored"
        );

        Ok(reference)
    }
}
