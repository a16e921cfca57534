//! In-Memory Job Lock Registry

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::ports::JobLockRegistryPort;

/// 内存任务锁注册表
///
/// 锁在首次使用时创建并一直保留到进程结束
#[derive(Default)]
pub struct InMemoryJobLockRegistry {
    /// job_id -> 任务锁
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl InMemoryJobLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobLockRegistryPort for InMemoryJobLockRegistry {
    fn lock_for(&self, job_id: i64) -> Arc<Mutex<()>> {
        // entry 持有分片写锁，并发首次访问只会创建一把锁
        self.locks
            .entry(job_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn len(&self) -> usize {
        self.locks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_same_job_same_lock() {
        let registry = InMemoryJobLockRegistry::new();
        let a = registry.lock_for(1);
        let b = registry.lock_for(1);
        let c = registry.lock_for(2);

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_creation_yields_one_lock() {
        let registry = Arc::new(InMemoryJobLockRegistry::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move { registry.lock_for(7) }));
        }

        let mut locks = Vec::new();
        for handle in handles {
            locks.push(handle.await.unwrap());
        }

        assert!(locks.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_lock_serializes_critical_section() {
        let registry = Arc::new(InMemoryJobLockRegistry::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = registry.clone();
            let inside = inside.clone();
            let max_inside = max_inside.clone();
            handles.push(tokio::spawn(async move {
                let lock = registry.lock_for(3);
                let _guard = lock.lock().await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_jobs_do_not_block() {
        let registry = InMemoryJobLockRegistry::new();
        let lock_a = registry.lock_for(1);
        let _held = lock_a.lock().await;

        let lock_b = registry.lock_for(2);
        let acquired = tokio::time::timeout(Duration::from_millis(100), lock_b.lock()).await;
        assert!(acquired.is_ok());
    }
}
