use crate::loader::{BulkLoader, IndexSnapshot};
use pricebook_core::cache::error::CacheError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::info;

/// 加载任务与索引共享的发布状态
struct Published {
    // 无锁快速路径使用的加载标记
    loaded: AtomicBool,
    // 当前发布的只读快照
    snapshot: RwLock<Arc<IndexSnapshot>>,
    // 已完成的批量加载次数
    load_runs: AtomicU64,
}

/// # Summary
/// 进程级内存行情索引及其懒加载协调器。
///
/// # Invariants
/// - 批量加载在整个生命周期内最多执行一次，除非显式调用 `reset`。
/// - `loaded` 与快照只在 `load_lock` 临界区内更新。
/// - 快照构建完成后整体替换，读者不会观察到填充中的索引。
/// - 加载一旦开始就会完成并发布，与发起调用的 future 是否被丢弃无关。
pub struct PriceIndex {
    // 数据源加载器
    loader: BulkLoader,
    // 加载与重载的互斥临界区，锁由加载任务持有直到发布完成
    load_lock: Arc<Mutex<()>>,
    state: Arc<Published>,
}

impl PriceIndex {
    pub fn new(loader: BulkLoader) -> Self {
        Self {
            loader,
            load_lock: Arc::new(Mutex::new(())),
            state: Arc::new(Published {
                loaded: AtomicBool::new(false),
                snapshot: RwLock::new(Arc::new(IndexSnapshot::default())),
                load_runs: AtomicU64::new(0),
            }),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.state.loaded.load(Ordering::Acquire)
    }

    /// 批量加载实际执行的次数
    pub fn load_runs(&self) -> u64 {
        self.state.load_runs.load(Ordering::Acquire)
    }

    /// # Summary
    /// 确保索引已加载，可被任意数量的任务并发调用。
    ///
    /// # Logic
    /// 1. 快速路径：标记已为 true 时直接返回。
    /// 2. 获取互斥锁后再次检查标记（双重检查）。
    /// 3. 仍未加载则执行批量加载并发布快照。
    ///
    /// 等待锁的调用方在加载完成后会看到 `loaded = true` 并直接返回。
    pub async fn ensure_loaded(&self) -> Result<(), CacheError> {
        if self.is_loaded() {
            return Ok(());
        }

        let guard = self.load_lock.clone().lock_owned().await;
        if self.is_loaded() {
            return Ok(());
        }
        self.load_locked(guard).await
    }

    /// # Summary
    /// 清空索引并同步重新加载。
    ///
    /// # Logic
    /// 1. 获取与 `ensure_loaded` 相同的互斥锁。
    /// 2. 清除加载标记，新的查询在锁上等待。
    /// 3. 在同一临界区内重新加载，返回前索引已可用。
    ///
    /// 已经持有旧快照的读者继续使用旧数据，直到新快照发布。
    /// 调用方中途放弃等待时，重载仍会在后台完成。
    pub async fn reset(&self) -> Result<(), CacheError> {
        let guard = self.load_lock.clone().lock_owned().await;
        info!("Resetting price cache");
        self.state.loaded.store(false, Ordering::Release);
        self.load_locked(guard).await
    }

    /// 获取当前快照的共享引用
    pub async fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.state.snapshot.read().await.clone()
    }

    /// # Summary
    /// 在独立任务中执行一次批量加载并发布。
    ///
    /// # Logic
    /// 1. 锁的所有权移入任务，临界区持续到发布完成。
    /// 2. 在阻塞线程池上读取并解析全部数据文件。
    /// 3. 整体替换快照，最后置位加载标记。
    ///
    /// 调用方只等待任务结果，丢弃等待不会中断加载。
    async fn load_locked(&self, guard: OwnedMutexGuard<()>) -> Result<(), CacheError> {
        let loader = self.loader.clone();
        let state = self.state.clone();

        let task = tokio::spawn(async move {
            let _guard = guard;
            let snapshot = tokio::task::spawn_blocking(move || loader.load_all())
                .await
                .map_err(|e| CacheError::Load(e.to_string()))?;

            *state.snapshot.write().await = Arc::new(snapshot);
            state.load_runs.fetch_add(1, Ordering::AcqRel);
            state.loaded.store(true, Ordering::Release);
            Ok(())
        });

        task.await.map_err(|e| CacheError::Load(e.to_string()))?
    }
}
