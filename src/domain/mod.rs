//! Domain Layer - 领域层
//!
//! 限界上下文:
//! - Synthesis Context: 语音合成任务

pub mod synthesis;
