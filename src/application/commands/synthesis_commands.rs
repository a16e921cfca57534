//! Synthesis Commands - 合成任务相关命令

use crate::domain::synthesis::AudioFormat;

/// 合成模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SynthesisMode {
    /// 提交到服务商异步队列，通过轮询取回结果
    #[default]
    Async,
    /// 立即合成并落盘
    Sync,
}

impl SynthesisMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "async" => Some(SynthesisMode::Async),
            "sync" => Some(SynthesisMode::Sync),
            _ => None,
        }
    }
}

/// 提交合成任务命令
///
/// 未提供的参数使用配置中的默认值
#[derive(Debug, Clone, Default)]
pub struct SubmitSynthesis {
    pub text: Option<String>,
    pub text_file_id: Option<i64>,
    pub voice_id: String,
    pub model: Option<String>,
    pub speed: Option<f64>,
    pub volume: Option<f64>,
    pub format: Option<AudioFormat>,
    pub mode: SynthesisMode,
    pub key_id: Option<i64>,
}

/// 检查任务状态命令（可能触发下载，因此属于命令侧）
#[derive(Debug, Clone)]
pub struct CheckSynthesisStatus {
    pub job_id: i64,
    pub key_id: Option<i64>,
}

/// 删除任务命令
#[derive(Debug, Clone)]
pub struct DeleteSynthesis {
    pub job_id: i64,
}

/// 上传待合成的文本文件
#[derive(Debug, Clone)]
pub struct UploadTextFile {
    pub filename: String,
    pub data: Vec<u8>,
    pub key_id: Option<i64>,
}
