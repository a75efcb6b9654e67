use crate::common::Granularity;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 当日最高价占位文本
pub const WITHHELD_HIGH: &str = "You can not get the current high price";
/// 当日最低价占位文本
pub const WITHHELD_LOW: &str = "You can not get the current low price";
/// 当日收盘价占位文本
pub const WITHHELD_CLOSE: &str = "You can not get the next close price";
/// 当日成交量占位文本
pub const WITHHELD_VOLUME: &str = "You can not get the current volume";

/// # Summary
/// 单根 OHLCV 行情数据，加载后不可变。
///
/// # Invariants
/// - 任一字段都可能为空，数据源缺失或无法解析时保留为 None。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    // 开盘价
    pub open: Option<Decimal>,
    // 最高价
    pub high: Option<Decimal>,
    // 最低价
    pub low: Option<Decimal>,
    // 收盘价
    pub close: Option<Decimal>,
    // 成交量
    pub volume: Option<Decimal>,
}

/// 日期或时间戳字符串到行情数据的映射，按键精确查找。
pub type Series = HashMap<String, Bar>;

/// 数据源携带的原样元数据
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// # Summary
/// 单个标的在内存索引中的完整记录。
///
/// # Invariants
/// - `metadata` 取自首次遇到该标的的文档，后续合并不会覆盖。
/// - 同一键在后加载的数据源中出现时，以后者为准。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub daily: Series,
    pub hourly: Series,
    pub metadata: Metadata,
}

impl SymbolRecord {
    pub fn new(metadata: Metadata) -> Self {
        Self {
            daily: Series::new(),
            hourly: Series::new(),
            metadata,
        }
    }

    pub fn series(&self, granularity: Granularity) -> &Series {
        match granularity {
            Granularity::Daily => &self.daily,
            Granularity::Hourly => &self.hourly,
        }
    }

    pub fn series_mut(&mut self, granularity: Granularity) -> &mut Series {
        match granularity {
            Granularity::Daily => &mut self.daily,
            Granularity::Hourly => &mut self.hourly,
        }
    }

    /// # Summary
    /// 按键倒序取最近的若干个可用键。
    ///
    /// # Logic
    /// 键均为零填充的日期/时间字符串，字典序即时间序。
    ///
    /// # Arguments
    /// * `granularity`: 目标序列。
    /// * `limit`: 返回数量上限。
    pub fn recent_keys(&self, granularity: Granularity, limit: usize) -> Vec<String> {
        let mut keys: Vec<&String> = self.series(granularity).keys().collect();
        keys.sort_unstable_by(|a, b| b.cmp(a));
        keys.into_iter().take(limit).cloned().collect()
    }
}

/// # Summary
/// 响应中的单个行情字段：原值，或当日尚未确定时的占位说明。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OhlcvField {
    Value(Option<Decimal>),
    Withheld(String),
}

impl OhlcvField {
    pub fn withheld(text: &str) -> Self {
        OhlcvField::Withheld(text.to_string())
    }
}

/// # Summary
/// 对外返回的 OHLCV 载荷。开盘价始终为原值。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ohlcv {
    pub open: Option<Decimal>,
    pub high: OhlcvField,
    pub low: OhlcvField,
    pub close: OhlcvField,
    pub volume: OhlcvField,
}

impl Ohlcv {
    /// 原样输出全部五个字段
    pub fn verbatim(bar: &Bar) -> Self {
        Self {
            open: bar.open,
            high: OhlcvField::Value(bar.high),
            low: OhlcvField::Value(bar.low),
            close: OhlcvField::Value(bar.close),
            volume: OhlcvField::Value(bar.volume),
        }
    }

    /// 当日交易尚未收盘，只保留开盘价
    pub fn redacted(bar: &Bar) -> Self {
        Self {
            open: bar.open,
            high: OhlcvField::withheld(WITHHELD_HIGH),
            low: OhlcvField::withheld(WITHHELD_LOW),
            close: OhlcvField::withheld(WITHHELD_CLOSE),
            volume: OhlcvField::withheld(WITHHELD_VOLUME),
        }
    }
}

/// # Summary
/// 一次成功的点查结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub symbol: String,
    pub date: String,
    pub ohlcv: Ohlcv,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bar(close: Decimal) -> Bar {
        Bar {
            open: Some(dec!(1)),
            high: Some(dec!(2)),
            low: None,
            close: Some(close),
            volume: Some(dec!(100)),
        }
    }

    #[test]
    fn test_recent_keys_descending_and_bounded() {
        let mut record = SymbolRecord::default();
        for day in 1..=9 {
            record
                .daily
                .insert(format!("2025-01-0{day}"), bar(Decimal::from(day)));
        }
        let keys = record.recent_keys(Granularity::Daily, 5);
        assert_eq!(
            keys,
            vec!["2025-01-09", "2025-01-08", "2025-01-07", "2025-01-06", "2025-01-05"]
        );
        assert!(record.recent_keys(Granularity::Hourly, 5).is_empty());
    }

    #[test]
    fn test_redacted_keeps_only_open() {
        let ohlcv = Ohlcv::redacted(&bar(dec!(3)));
        assert_eq!(ohlcv.open, Some(dec!(1)));
        assert_eq!(ohlcv.high, OhlcvField::withheld(WITHHELD_HIGH));
        assert_eq!(ohlcv.volume, OhlcvField::withheld(WITHHELD_VOLUME));
    }

    #[test]
    fn test_verbatim_passes_nulls_through() {
        let ohlcv = Ohlcv::verbatim(&bar(dec!(3)));
        assert_eq!(ohlcv.low, OhlcvField::Value(None));
        assert_eq!(ohlcv.close, OhlcvField::Value(Some(dec!(3))));
    }
}
