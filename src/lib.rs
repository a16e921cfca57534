//! Sonora - 异步语音合成任务编排服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Synthesis Context: 合成任务状态机
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SynthesisProvider, ArtifactStorage, JobLockRegistry, Repositories）
//! - Commands: 提交、状态检查、删除、凭证管理
//! - Queries: 任务历史、音频读取、凭证列表
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + 生成音频静态目录
//! - Adapters: 服务商 HTTP 客户端、本地文件存储
//! - Memory: 任务锁注册表
//! - Persistence: SQLite 存储

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
