//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::{CredentialSummary, UploadedTextFile};
use crate::domain::synthesis::{AudioFormat, JobStatus, SynthesisJob};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

// ============================================================================
// Synthesis DTOs
// ============================================================================

/// 提交合成请求
///
/// 除 voice_id 外均可省略，省略的参数使用配置默认值
#[derive(Debug, Deserialize)]
pub struct SubmitSynthesisRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub text_file_id: Option<i64>,
    pub voice_id: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default, alias = "volume")]
    pub vol: Option<f64>,
    #[serde(default)]
    pub format: Option<AudioFormat>,
    /// "async"（默认）或 "sync"
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub key_id: Option<i64>,
}

/// 查询状态时可指定凭证
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub key_id: Option<i64>,
}

/// 合成任务
#[derive(Debug, Serialize)]
pub struct SynthesisJobResponse {
    pub id: i64,
    pub task_id: i64,
    pub status: JobStatus,
    pub text: Option<String>,
    pub text_file_id: Option<i64>,
    pub voice_id: String,
    pub model: String,
    pub format: AudioFormat,
    pub speed: f64,
    pub vol: f64,
    pub output: Option<String>,
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&SynthesisJob> for SynthesisJobResponse {
    fn from(job: &SynthesisJob) -> Self {
        let params = job.params();
        Self {
            id: job.id(),
            task_id: job.remote_task_id(),
            status: job.status(),
            text: job.input().text().map(str::to_string),
            text_file_id: job.input().file_id(),
            voice_id: params.voice_id.clone(),
            model: params.model.clone(),
            format: params.format,
            speed: params.speed,
            vol: params.volume,
            output: job.output_path().map(str::to_string),
            error: job.error_detail().map(str::to_string),
            created_at: job.created_at().to_rfc3339(),
            updated_at: job.updated_at().to_rfc3339(),
        }
    }
}

/// 文本文件上传结果
#[derive(Debug, Serialize)]
pub struct UploadTextFileResponse {
    pub file_id: i64,
    pub filename: String,
}

impl From<UploadedTextFile> for UploadTextFileResponse {
    fn from(uploaded: UploadedTextFile) -> Self {
        Self {
            file_id: uploaded.file_id,
            filename: uploaded.filename,
        }
    }
}

// ============================================================================
// API Key DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddKeyRequest {
    #[serde(default)]
    pub platform: Option<String>,
    pub key: String,
    #[serde(default)]
    pub is_default: bool,
}

/// API Key（脱敏）
#[derive(Debug, Serialize)]
pub struct KeyResponse {
    pub id: i64,
    pub platform: String,
    pub key: String,
    pub is_default: bool,
    pub created_at: String,
}

impl From<CredentialSummary> for KeyResponse {
    fn from(summary: CredentialSummary) -> Self {
        Self {
            id: summary.id,
            platform: summary.platform,
            key: summary.masked_key,
            is_default: summary.is_default,
            created_at: summary.created_at.to_rfc3339(),
        }
    }
}
