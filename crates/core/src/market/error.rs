use thiserror::Error;

/// # Summary
/// 点查错误枚举。所有变体都是正常可报告的结果，由查询服务以值的形式返回给调用方。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - `Display` 文本即对外返回的 `error` 字段。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    // 日期格式与推断出的粒度不匹配
    #[error("date must be in {expected} format")]
    InvalidFormat { expected: &'static str },
    // 标的存在，但没有该日期的数据
    #[error("Data not found for date {date}. Sample available dates: {samples:?}")]
    DateNotFound { date: String, samples: Vec<String> },
    // 本地与远端均无该标的
    #[error("No records found for stock {symbol} in local data")]
    SymbolNotFound { symbol: String },
    // 内存索引未能完成加载
    #[error("Price cache unavailable: {0}")]
    Unavailable(String),
}
