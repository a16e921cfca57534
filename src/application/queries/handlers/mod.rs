//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod credential_handlers;
mod synthesis_handlers;

pub use credential_handlers::*;
pub use synthesis_handlers::*;
