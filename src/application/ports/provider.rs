//! Synthesis Provider Port - 远程语音合成服务抽象
//!
//! 定义调用外部合成服务的接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::synthesis::{SynthesisInput, SynthesisParams};

use super::Credential;

/// 服务商错误
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("api error {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// 业务层错误（base_resp.status_code != 0）
    #[error("provider error {code}: {message}")]
    Rejected { code: i64, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 远程任务状态
///
/// 在客户端边界完成解码，编排层只对有限集合做模式匹配
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteTaskStatus {
    Processing,
    Success,
    Failed,
    Expired,
    Unknown(String),
}

impl RemoteTaskStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Processing" => RemoteTaskStatus::Processing,
            "Success" => RemoteTaskStatus::Success,
            "Failed" => RemoteTaskStatus::Failed,
            "Expired" => RemoteTaskStatus::Expired,
            other => RemoteTaskStatus::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RemoteTaskStatus::Processing => "Processing",
            RemoteTaskStatus::Success => "Success",
            RemoteTaskStatus::Failed => "Failed",
            RemoteTaskStatus::Expired => "Expired",
            RemoteTaskStatus::Unknown(raw) => raw,
        }
    }
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub input: SynthesisInput,
    pub params: SynthesisParams,
}

/// 异步任务查询结果
#[derive(Debug, Clone)]
pub struct RemoteTaskState {
    pub status: RemoteTaskStatus,
    pub file_id: i64,
}

/// 文件元数据
#[derive(Debug, Clone)]
pub struct RemoteFile {
    pub file_id: i64,
    pub download_url: String,
}

/// 下载得到的原始响应
///
/// 传输层只负责取回字节，multipart 解析由编排层完成
#[derive(Debug, Clone)]
pub struct DownloadedPayload {
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// 同步合成结果
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    /// 已解码的音频字节
    pub audio: Vec<u8>,
    /// 音频时长（毫秒）
    pub audio_length_ms: Option<u64>,
}

/// Synthesis Provider Port
///
/// 一个实例绑定一个凭证，自身无状态
#[async_trait]
pub trait SynthesisProviderPort: Send + Sync {
    /// 提交异步合成任务，返回 remote_task_id
    async fn submit_async(&self, request: &SynthesisRequest) -> Result<i64, ProviderError>;

    /// 查询异步任务状态
    async fn query_status(&self, remote_task_id: i64) -> Result<RemoteTaskState, ProviderError>;

    /// 获取文件元数据（下载地址）
    async fn retrieve_file(&self, file_id: i64) -> Result<RemoteFile, ProviderError>;

    /// 下载文件，非 2xx 视为错误
    async fn download(&self, url: &str) -> Result<DownloadedPayload, ProviderError>;

    /// 同步合成
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio, ProviderError>;

    /// 上传文件，返回服务商文件 ID
    async fn upload_file(
        &self,
        filename: &str,
        data: Vec<u8>,
        purpose: &str,
    ) -> Result<i64, ProviderError>;
}

/// 按凭证构建 Provider Client
pub trait ProviderClientFactory: Send + Sync {
    fn client_for(
        &self,
        credential: &Credential,
    ) -> Result<Arc<dyn SynthesisProviderPort>, ProviderError>;
}
