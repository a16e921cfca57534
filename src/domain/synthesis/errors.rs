//! Synthesis Context - Errors

use thiserror::Error;

use super::JobStatus;

#[derive(Debug, Error, PartialEq)]
pub enum SynthesisError {
    #[error("text or text_file_id is required")]
    EmptyInput,

    #[error("invalid synthesis parameter: {0}")]
    InvalidParameter(String),

    #[error("job is already {0}, no further transition allowed")]
    TerminalState(JobStatus),
}
