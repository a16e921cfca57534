//! SQLite Persistence - SQLite 数据库持久化实现

mod credential_repo;
mod database;
mod job_repo;

pub use credential_repo::*;
pub use database::*;
pub use job_repo::*;
