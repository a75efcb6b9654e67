use crate::cache::entity::{CacheStats, PublishReport};
use crate::cache::error::CacheError;
use crate::market::entity::PriceQuote;
use crate::market::error::LookupError;
use async_trait::async_trait;

/// # Summary
/// 行情点查服务契约 (Port)，供 HTTP 网关等外层协作者调用。
///
/// # Invariants
/// - 查询失败以 `LookupError` 值返回，绝不 panic。
/// - 实现者保证内存索引在整个进程内最多加载一次，除非显式刷新。
#[async_trait]
pub trait PriceCache: Send + Sync {
    /// # Summary
    /// 查询某标的在某日期或时间戳的 OHLCV。
    ///
    /// # Logic
    /// 1. 根据输入结构推断日线或小时线并严格校验格式。
    /// 2. 确保内存索引已加载。
    /// 3. 查询内存索引，标的完全缺失时回退到远端存储。
    /// 4. 对当日数据执行脱敏。
    ///
    /// # Arguments
    /// * `symbol`: 标的代码，大小写敏感。
    /// * `date`: `YYYY-MM-DD` 或 `YYYY-MM-DD HH:MM:SS`。
    async fn lookup(&self, symbol: &str, date: &str) -> Result<PriceQuote, LookupError>;

    /// 返回缓存统计，必要时先触发加载
    async fn stats(&self) -> Result<CacheStats, CacheError>;

    /// # Summary
    /// 清空并重新加载内存索引。
    ///
    /// # Returns
    /// 重新加载完成后的统计快照。
    async fn refresh(&self) -> Result<CacheStats, CacheError>;

    /// # Summary
    /// 将某标的的全部本地行情写入远端存储。
    ///
    /// # Returns
    /// 成功与失败的写入计数；标的不存在或远端未启用时返回 `CacheError`。
    async fn publish_symbol(&self, symbol: &str) -> Result<PublishReport, CacheError>;
}
