use thiserror::Error;

/// # Summary
/// 行情缓存域错误枚举，处理索引加载与管理操作失败。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug)]
pub enum CacheError {
    // 批量加载任务异常终止
    #[error("Load error: {0}")]
    Load(String),
    // 管理操作指向的标的不在内存索引中
    #[error("Symbol not found in local data: {0}")]
    SymbolNotFound(String),
    // 远端存储未启用
    #[error("Remote store is not enabled")]
    RemoteDisabled,
}
