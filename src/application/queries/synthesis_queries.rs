//! Synthesis Queries - 任务查询

use std::path::PathBuf;

/// 列出全部任务（按创建时间倒序）
#[derive(Debug, Clone)]
pub struct ListSynthesisJobs;

/// 获取任务详情（只读，不触发远程调用）
#[derive(Debug, Clone)]
pub struct GetSynthesisJob {
    pub job_id: i64,
}

/// 获取任务产物文件
#[derive(Debug, Clone)]
pub struct GetSynthesisAudio {
    pub job_id: i64,
}

/// 产物文件位置
#[derive(Debug, Clone)]
pub struct SynthesisAudioFile {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: &'static str,
}
