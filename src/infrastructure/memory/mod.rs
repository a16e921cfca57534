//! Memory Layer - 进程内状态
//!
//! 按任务 ID 的互斥锁注册表

mod job_locks;

pub use job_locks::InMemoryJobLockRegistry;
