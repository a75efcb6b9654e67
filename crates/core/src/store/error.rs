use thiserror::Error;

/// # Summary
/// 远端存储错误枚举，处理连接、读写失败等问题。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 只在适配器内部流转，查询路径上统一降级为"不存在"。
#[derive(Error, Debug)]
pub enum StoreError {
    /// 数据库操作失败
    #[error("Database error: {0}")]
    Database(String),
    /// 行数据无法还原
    #[error("Corrupt row: {0}")]
    Corrupt(String),
    /// 未知或未分类的错误
    #[error("Unknown error: {0}")]
    Unknown(String),
    /// 初始化存储失败
    #[error("Initialization error: {0}")]
    InitError(String),
}
