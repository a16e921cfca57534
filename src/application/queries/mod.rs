//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：处理所有读操作

mod credential_queries;
mod synthesis_queries;

pub mod handlers;

pub use credential_queries::*;
pub use synthesis_queries::*;
