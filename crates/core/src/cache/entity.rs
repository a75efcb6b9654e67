use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 统计结果中最多列出的标的数量
pub const STATS_SYMBOL_SAMPLE: usize = 20;

/// # Summary
/// 行情缓存的聚合统计快照。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub cache_loaded: bool,
    pub total_symbols: usize,
    pub total_daily_entries: usize,
    pub total_hourly_entries: usize,
    pub remote_enabled: bool,
    // 按字典序排列的前若干个标的
    pub symbols: Vec<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

/// # Summary
/// 将单个标的推送到远端存储后的结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReport {
    pub symbol: String,
    pub written: usize,
    pub failed: usize,
}
