//! Synthesis Context - 语音合成任务限界上下文
//!
//! 职责:
//! - 合成任务（SynthesisJob）状态机
//! - 合成输入与参数的校验

mod errors;
mod job;
mod value_objects;

pub use errors::SynthesisError;
pub use job::{JobParts, NewSynthesisJob, SynthesisJob};
pub use value_objects::{AudioFormat, JobStatus, SynthesisInput, SynthesisParams};
