use crate::index::PriceIndex;
use pricebook_core::common::Granularity;
use pricebook_core::common::time::TodayProvider;
use pricebook_core::market::entity::{Bar, Ohlcv, PriceQuote};
use pricebook_core::market::error::LookupError;
use pricebook_core::store::port::{RemoteStore, RemoteStoreExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// 未找到日期时返回的候选日期数量
const SAMPLE_KEYS: usize = 5;

/// 远端读取的默认超时
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_millis(2000);

/// # Summary
/// 行情点查服务，组合内存索引、远端存储与当前日期供给器。
///
/// # Invariants
/// - 每个进程持有一个实例，通过 `Arc` 在请求任务间共享。
/// - 远端读取结果不写回内存索引，每次回退都重新查询。
pub struct PriceService {
    pub(crate) index: PriceIndex,
    pub(crate) remote: Arc<dyn RemoteStore>,
    today: Arc<dyn TodayProvider>,
    remote_timeout: Duration,
}

impl PriceService {
    /// # Summary
    /// 创建查询服务。索引此时尚未加载，首次查询或显式 `ensure_loaded` 时触发。
    ///
    /// # Arguments
    /// * `index`: 内存索引。
    /// * `remote`: 远端存储，未配置时传入禁用实现。
    /// * `today`: 当前日期供给器。
    pub fn new(
        index: PriceIndex,
        remote: Arc<dyn RemoteStore>,
        today: Arc<dyn TodayProvider>,
    ) -> Self {
        Self {
            index,
            remote,
            today,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn index(&self) -> &PriceIndex {
        &self.index
    }

    /// # Summary
    /// 按输入结构自动选择日线或小时线查询。
    ///
    /// # Logic
    /// 含有空格或 `T` 的输入按小时线处理，否则按日线处理。
    pub async fn lookup(&self, symbol: &str, date: &str) -> Result<PriceQuote, LookupError> {
        self.lookup_with(symbol, date, Granularity::detect(date)).await
    }

    pub async fn lookup_daily(&self, symbol: &str, date: &str) -> Result<PriceQuote, LookupError> {
        self.lookup_with(symbol, date, Granularity::Daily).await
    }

    pub async fn lookup_hourly(&self, symbol: &str, date: &str) -> Result<PriceQuote, LookupError> {
        self.lookup_with(symbol, date, Granularity::Hourly).await
    }

    /// # Summary
    /// 指定粒度的点查主流程。
    ///
    /// # Logic
    /// 1. 严格校验格式，失败直接返回，不触碰索引与远端。
    /// 2. 确保索引已加载。
    /// 3. 命中索引则脱敏后返回。
    /// 4. 标的存在但缺少该键，返回最近的可用键，不回退远端。
    /// 5. 标的不存在（或该粒度序列为空）时查询远端。
    /// 6. 仍未命中返回标的不存在。
    async fn lookup_with(
        &self,
        symbol: &str,
        date: &str,
        granularity: Granularity,
    ) -> Result<PriceQuote, LookupError> {
        if !granularity.validate(date) {
            return Err(LookupError::InvalidFormat {
                expected: granularity.expected_format(),
            });
        }

        self.index
            .ensure_loaded()
            .await
            .map_err(|e| LookupError::Unavailable(e.to_string()))?;

        let snapshot = self.index.snapshot().await;
        if let Some(record) = snapshot.get(symbol) {
            if let Some(bar) = record.series(granularity).get(date) {
                return Ok(self.shape(symbol, date, bar));
            }

            let samples = record.recent_keys(granularity, SAMPLE_KEYS);
            if !samples.is_empty() {
                return Err(LookupError::DateNotFound {
                    date: date.to_string(),
                    samples,
                });
            }
        }

        if let Some(bar) = self.fetch_remote(symbol, date, granularity).await {
            return Ok(self.shape(symbol, date, &bar));
        }

        Err(LookupError::SymbolNotFound {
            symbol: symbol.to_string(),
        })
    }

    /// # Summary
    /// 带超时的远端回退读取。
    ///
    /// # Logic
    /// 1. 远端未启用时直接返回 None。
    /// 2. 超时与适配器错误一律视为不存在，不重试。
    async fn fetch_remote(&self, symbol: &str, date: &str, granularity: Granularity) -> Option<Bar> {
        if !self.remote.is_enabled() {
            return None;
        }

        let row_key = granularity.row_key(date);
        debug!("Falling back to remote store for {}/{}", symbol, row_key);
        match tokio::time::timeout(self.remote_timeout, self.remote.get(symbol, &row_key)).await {
            Ok(row) => row.map(|row| row.bar()),
            Err(_) => {
                warn!(
                    "Remote get timed out after {:?} for {}/{}",
                    self.remote_timeout, symbol, row_key
                );
                None
            }
        }
    }

    /// # Summary
    /// 构造响应，对当前交易日执行脱敏。
    ///
    /// # Logic
    /// 请求字符串与当前日期完全相等时只保留开盘价，其余字段替换为占位说明。
    fn shape(&self, symbol: &str, date: &str, bar: &Bar) -> PriceQuote {
        let ohlcv = if self.today.is_today(date) {
            Ohlcv::redacted(bar)
        } else {
            Ohlcv::verbatim(bar)
        };
        PriceQuote {
            symbol: symbol.to_string(),
            date: date.to_string(),
            ohlcv,
        }
    }
}
