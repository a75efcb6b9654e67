pub mod time;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 日线日期键格式
pub const DAILY_FORMAT: &str = "%Y-%m-%d";
/// 小时线时间戳键格式
pub const HOURLY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 远端存储中小时线行键的前缀
const HOURLY_ROW_PREFIX: &str = "hourly_";

/// # Summary
/// 行情序列的时间粒度。
///
/// # Invariants
/// - 日线以 `YYYY-MM-DD` 为键，小时线以 `YYYY-MM-DD HH:MM:SS` 为键。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    // 日线
    Daily,
    // 小时线
    Hourly,
}

impl Granularity {
    /// # Summary
    /// 根据输入字符串的结构特征推断粒度。
    ///
    /// # Logic
    /// 1. 含有空格或字母 `T` 视为小时线。
    /// 2. 其余情况视为日线。
    ///
    /// 该判断只看结构，不做解析，校验由 [`Granularity::validate`] 负责。
    pub fn detect(date: &str) -> Self {
        if date.contains(' ') || date.contains('T') {
            Granularity::Hourly
        } else {
            Granularity::Daily
        }
    }

    /// 面向调用方的格式说明，用于错误提示。
    pub fn expected_format(&self) -> &'static str {
        match self {
            Granularity::Daily => "YYYY-MM-DD",
            Granularity::Hourly => "YYYY-MM-DD HH:MM:SS",
        }
    }

    /// # Summary
    /// 按当前粒度严格校验日期字符串。
    ///
    /// # Returns
    /// 合法返回 true。
    pub fn validate(&self, date: &str) -> bool {
        match self {
            Granularity::Daily => NaiveDate::parse_from_str(date, DAILY_FORMAT).is_ok(),
            Granularity::Hourly => NaiveDateTime::parse_from_str(date, HOURLY_FORMAT).is_ok(),
        }
    }

    /// # Summary
    /// 生成远端存储的行键。
    ///
    /// # Logic
    /// 日线直接使用日期；小时线加上 `hourly_` 前缀，避免与日线键冲突。
    pub fn row_key(&self, key: &str) -> String {
        match self {
            Granularity::Daily => key.to_string(),
            Granularity::Hourly => format!("{HOURLY_ROW_PREFIX}{key}"),
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" | "1d" => Ok(Granularity::Daily),
            "hourly" | "1h" | "60min" => Ok(Granularity::Hourly),
            _ => Err(format!("Unknown Granularity: {}", s)),
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::Daily => write!(f, "daily"),
            Granularity::Hourly => write!(f, "hourly"),
        }
    }
}
