use super::error::StoreError;
use crate::common::Granularity;
use crate::market::entity::Bar;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// # Summary
/// 远端分区 KV 存储中的一行行情数据。
///
/// # Invariants
/// - `partition_key` 为标的代码。
/// - `row_key` 日线为日期，小时线为 `hourly_` 加时间戳。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRow {
    pub partition_key: String,
    pub row_key: String,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Option<Decimal>,
    pub volume: Option<Decimal>,
    // 数据类型标记 (daily / hourly)
    pub data_type: Granularity,
    // 写入时间
    pub timestamp: DateTime<Utc>,
}

impl RemoteRow {
    /// 由本地行情数据构造待写入的行
    pub fn from_bar(symbol: &str, row_key: &str, bar: &Bar, granularity: Granularity) -> Self {
        Self {
            partition_key: symbol.to_string(),
            row_key: row_key.to_string(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            data_type: granularity,
            timestamp: Utc::now(),
        }
    }

    pub fn bar(&self) -> Bar {
        Bar {
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        }
    }
}

/// # Summary
/// 外部分区 KV 存储接口 (Port)，作为内存索引的兜底读源与写入目标。
///
/// # Invariants
/// - 实现者只负责按主键读写，不做任何缓存。
/// - 错误如实返回，降级策略由 [`RemoteStoreExt`] 统一实现。
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// 是否连接了真实的存储后端
    fn is_enabled(&self) -> bool {
        true
    }

    /// # Summary
    /// 按分区键与行键读取一行。
    ///
    /// # Returns
    /// 存在返回 `Some(RemoteRow)`，不存在返回 None。
    async fn fetch_row(
        &self,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<RemoteRow>, StoreError>;

    /// # Summary
    /// 写入或覆盖一行。
    ///
    /// # Logic
    /// 以 (`partition_key`, `row_key`) 为主键执行 upsert。
    async fn upsert_row(&self, row: &RemoteRow) -> Result<(), StoreError>;
}

/// # Summary
/// 远端存储的尽力而为扩展接口，查询路径只通过它访问远端。
///
/// # Invariants
/// - 自动为所有实现 `RemoteStore` 的类型提供支持。
/// - 永不向调用方返回错误："不存在"与"不可达"对调用方不可区分。
#[async_trait]
pub trait RemoteStoreExt: RemoteStore {
    /// # Summary
    /// 读取一行，任何适配器错误都视为不存在。
    ///
    /// # Logic
    /// 1. 调用底层 `fetch_row`。
    /// 2. 出错时记录 warn 日志并返回 None。
    async fn get(&self, symbol: &str, row_key: &str) -> Option<RemoteRow> {
        match self.fetch_row(symbol, row_key).await {
            Ok(row) => row,
            Err(e) => {
                warn!("Remote get failed for {}/{}: {}", symbol, row_key, e);
                None
            }
        }
    }

    /// # Summary
    /// 尽力写入一根行情数据。
    ///
    /// # Returns
    /// 写入成功返回 true，失败记录日志后返回 false。
    async fn put(&self, symbol: &str, row_key: &str, bar: &Bar, granularity: Granularity) -> bool {
        let row = RemoteRow::from_bar(symbol, row_key, bar, granularity);
        match self.upsert_row(&row).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Remote put failed for {}/{}: {}", symbol, row_key, e);
                false
            }
        }
    }
}

impl<T: RemoteStore + ?Sized> RemoteStoreExt for T {}
