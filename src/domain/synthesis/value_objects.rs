//! Synthesis Context - Value Objects

use serde::{Deserialize, Serialize};

use super::SynthesisError;

/// 任务状态
///
/// 只能向前迁移: processing -> success | failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Processing,
    Success,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Success => "success",
            JobStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "processing" => Some(JobStatus::Processing),
            "success" => Some(JobStatus::Success),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    /// 终态不会再发生任何迁移
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 输出音频格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Wav,
    Flac,
    Pcm,
}

impl AudioFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::Flac => "flac",
            AudioFormat::Pcm => "pcm",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            "flac" => Some(AudioFormat::Flac),
            "pcm" => Some(AudioFormat::Pcm),
            _ => None,
        }
    }

    /// 文件扩展名
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Flac => "audio/flac",
            AudioFormat::Pcm => "application/octet-stream",
        }
    }
}

/// 合成输入：内联文本或服务商侧的文本文件 ID，至少其一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisInput {
    text: Option<String>,
    file_id: Option<i64>,
}

impl SynthesisInput {
    pub fn new(text: Option<String>, file_id: Option<i64>) -> Result<Self, SynthesisError> {
        let text = text.filter(|t| !t.trim().is_empty());
        let file_id = file_id.filter(|id| *id > 0);
        if text.is_none() && file_id.is_none() {
            return Err(SynthesisError::EmptyInput);
        }
        Ok(Self { text, file_id })
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn file_id(&self) -> Option<i64> {
        self.file_id
    }
}

/// 合成参数，提交后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisParams {
    pub voice_id: String,
    pub model: String,
    pub format: AudioFormat,
    pub sample_rate: u32,
    pub bitrate: u32,
    pub channels: u8,
    pub speed: f64,
    pub volume: f64,
}

impl SynthesisParams {
    pub fn validate(&self) -> Result<(), SynthesisError> {
        if self.voice_id.trim().is_empty() {
            return Err(SynthesisError::InvalidParameter(
                "voice_id cannot be empty".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(SynthesisError::InvalidParameter(
                "model cannot be empty".to_string(),
            ));
        }
        if !(0.5..=2.0).contains(&self.speed) {
            return Err(SynthesisError::InvalidParameter(format!(
                "speed must be within 0.5..=2.0, got {}",
                self.speed
            )));
        }
        if self.volume <= 0.0 || self.volume > 10.0 {
            return Err(SynthesisError::InvalidParameter(format!(
                "volume must be within (0, 10], got {}",
                self.volume
            )));
        }
        if !matches!(self.channels, 1 | 2) {
            return Err(SynthesisError::InvalidParameter(format!(
                "channels must be 1 or 2, got {}",
                self.channels
            )));
        }
        Ok(())
    }
}
