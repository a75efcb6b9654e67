//! # DTO (Data Transfer Object) 层
//!
//! 将内部领域模型转化为面向调用方 JSON 输出的轻量结构体。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。
//! 价格一律以字符串输出，保留数据源的原始精度。

use pricebook_core::cache::entity::{CacheStats, PublishReport};
use pricebook_core::market::entity::{OhlcvField, PriceQuote};
use pricebook_core::market::error::LookupError;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ============================================================
//  行情点查 DTO
// ============================================================

/// 点查请求参数
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PriceQuery {
    /// 标的代码，大小写敏感，如 `IBM`、`600243.SH`
    pub symbol: String,
    /// `YYYY-MM-DD` 或 `YYYY-MM-DD HH:MM:SS`
    pub date: String,
}

/// OHLCV 载荷。当日数据的 high/low/close/volume 为占位说明文本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OhlcvResponse {
    #[schema(example = "160.0000")]
    pub open: Option<String>,
    #[schema(example = "162.5000")]
    pub high: Option<String>,
    #[schema(example = "159.2500")]
    pub low: Option<String>,
    #[schema(example = "161.7500")]
    pub close: Option<String>,
    #[schema(example = "4120000")]
    pub volume: Option<String>,
}

fn field_text(field: &OhlcvField) -> Option<String> {
    match field {
        OhlcvField::Value(value) => value.map(|d| d.to_string()),
        OhlcvField::Withheld(text) => Some(text.clone()),
    }
}

/// 点查结果：成功时带 `ohlcv`，失败时带 `error`，两者均回显 `symbol` 与 `date`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceResponse {
    #[schema(example = "IBM")]
    pub symbol: String,
    #[schema(example = "2024-01-02")]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ohlcv: Option<OhlcvResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PriceResponse {
    /// 将查询结果（成功或失败）统一转换为响应体
    pub fn from_outcome(symbol: &str, date: &str, outcome: Result<PriceQuote, LookupError>) -> Self {
        match outcome {
            Ok(quote) => Self {
                symbol: quote.symbol,
                date: quote.date,
                ohlcv: Some(OhlcvResponse {
                    open: quote.ohlcv.open.map(|d| d.to_string()),
                    high: field_text(&quote.ohlcv.high),
                    low: field_text(&quote.ohlcv.low),
                    close: field_text(&quote.ohlcv.close),
                    volume: field_text(&quote.ohlcv.volume),
                }),
                error: None,
            },
            Err(e) => Self {
                symbol: symbol.to_string(),
                date: date.to_string(),
                ohlcv: None,
                error: Some(e.to_string()),
            },
        }
    }
}

// ============================================================
//  缓存管理 DTO
// ============================================================

/// 缓存统计 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CacheStatsResponse {
    pub cache_loaded: bool,
    pub total_symbols: usize,
    pub total_daily_entries: usize,
    pub total_hourly_entries: usize,
    pub remote_enabled: bool,
    /// 最多 20 个标的样本
    pub symbols: Vec<String>,
    /// RFC 3339 格式的加载时间
    pub loaded_at: Option<String>,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            cache_loaded: stats.cache_loaded,
            total_symbols: stats.total_symbols,
            total_daily_entries: stats.total_daily_entries,
            total_hourly_entries: stats.total_hourly_entries,
            remote_enabled: stats.remote_enabled,
            symbols: stats.symbols,
            loaded_at: stats.loaded_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// 远端推送结果 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublishResponse {
    #[schema(example = "IBM")]
    pub symbol: String,
    pub written: usize,
    pub failed: usize,
}

impl From<PublishReport> for PublishResponse {
    fn from(report: PublishReport) -> Self {
        Self {
            symbol: report.symbol,
            written: report.written,
            failed: report.failed,
        }
    }
}

// ============================================================
//  通用响应包装
// ============================================================

/// 统一成功响应包装
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T: Serialize + ToSchema> {
    /// 是否成功
    pub success: bool,
    /// 数据载荷 (成功时)
    pub data: Option<T>,
    /// 错误信息 (失败时)
    pub error: Option<String>,
}

impl<T: Serialize + ToSchema> ApiResponse<T> {
    /// 构建成功响应
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// 构建失败响应 (不含泛型载荷)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 错误描述信息
    pub error: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}
