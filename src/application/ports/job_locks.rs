//! Job Lock Registry Port - 单飞锁注册表
//!
//! 每个本地任务 ID 对应一把独占锁，保证同一任务同一时刻
//! 只有一个状态检查/下载流程在执行

use std::sync::Arc;
use tokio::sync::Mutex;

/// Job Lock Registry Port
pub trait JobLockRegistryPort: Send + Sync {
    /// 获取（不存在则原子地创建）任务锁
    fn lock_for(&self, job_id: i64) -> Arc<Mutex<()>>;

    /// 已创建的锁数量
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
