use crate::service::PriceService;
use async_trait::async_trait;
use pricebook_core::cache::entity::{CacheStats, PublishReport, STATS_SYMBOL_SAMPLE};
use pricebook_core::cache::error::CacheError;
use pricebook_core::cache::port::PriceCache;
use pricebook_core::common::Granularity;
use pricebook_core::market::entity::PriceQuote;
use pricebook_core::market::error::LookupError;
use pricebook_core::store::port::RemoteStoreExt;
use tracing::info;

impl PriceService {
    /// # Summary
    /// 汇总缓存统计。
    ///
    /// # Logic
    /// 1. 确保索引已加载。
    /// 2. 累加全部标的的日线与小时线条目数。
    /// 3. 取字典序前若干个标的作为样本。
    pub async fn stats(&self) -> Result<CacheStats, CacheError> {
        self.index.ensure_loaded().await?;
        let snapshot = self.index.snapshot().await;

        let mut symbols: Vec<&String> = snapshot.records.keys().collect();
        symbols.sort_unstable();

        Ok(CacheStats {
            cache_loaded: self.index.is_loaded(),
            total_symbols: snapshot.len(),
            total_daily_entries: snapshot.records.values().map(|r| r.daily.len()).sum(),
            total_hourly_entries: snapshot.records.values().map(|r| r.hourly.len()).sum(),
            remote_enabled: self.remote.is_enabled(),
            symbols: symbols.into_iter().take(STATS_SYMBOL_SAMPLE).cloned().collect(),
            loaded_at: snapshot.loaded_at,
        })
    }

    /// 清空并重新加载索引，返回新的统计
    pub async fn reset(&self) -> Result<CacheStats, CacheError> {
        self.index.reset().await?;
        self.stats().await
    }

    /// # Summary
    /// 将某标的的全部本地行情写入远端存储。
    ///
    /// # Logic
    /// 1. 远端未启用时直接返回 `RemoteDisabled`。
    /// 2. 依次写入日线与小时线，单条失败只计数不中断。
    pub async fn publish_symbol(&self, symbol: &str) -> Result<PublishReport, CacheError> {
        if !self.remote.is_enabled() {
            return Err(CacheError::RemoteDisabled);
        }
        self.index.ensure_loaded().await?;
        let snapshot = self.index.snapshot().await;
        let record = snapshot
            .get(symbol)
            .ok_or_else(|| CacheError::SymbolNotFound(symbol.to_string()))?;

        let mut report = PublishReport {
            symbol: symbol.to_string(),
            written: 0,
            failed: 0,
        };
        for granularity in [Granularity::Daily, Granularity::Hourly] {
            for (key, bar) in record.series(granularity) {
                let row_key = granularity.row_key(key);
                if self.remote.put(symbol, &row_key, bar, granularity).await {
                    report.written += 1;
                } else {
                    report.failed += 1;
                }
            }
        }

        info!(
            "Published {} to remote store: {} written, {} failed",
            symbol, report.written, report.failed
        );
        Ok(report)
    }
}

#[async_trait]
impl PriceCache for PriceService {
    async fn lookup(&self, symbol: &str, date: &str) -> Result<PriceQuote, LookupError> {
        PriceService::lookup(self, symbol, date).await
    }

    async fn stats(&self) -> Result<CacheStats, CacheError> {
        PriceService::stats(self).await
    }

    async fn refresh(&self) -> Result<CacheStats, CacheError> {
        self.reset().await
    }

    async fn publish_symbol(&self, symbol: &str) -> Result<PublishReport, CacheError> {
        PriceService::publish_symbol(self, symbol).await
    }
}
