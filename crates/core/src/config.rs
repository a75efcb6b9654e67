use crate::common::Granularity;
use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub remote: RemoteConfig,
    pub market: MarketConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8003,
        }
    }
}

/// 行情数据文件根目录与有序的数据源列表
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub root: String,
    // 顺序决定合并优先级，后者覆盖前者
    pub sources: Vec<SourceConfig>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: "data".to_string(),
            sources: default_sources(),
        }
    }
}

/// 单个 JSONL 数据源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    // 相对于数据根目录的路径
    pub path: String,
    // 文档中时间序列对象的字段名
    pub series_key: String,
    pub granularity: Granularity,
}

impl SourceConfig {
    pub fn new(path: &str, series_key: &str, granularity: Granularity) -> Self {
        Self {
            path: path.to_string(),
            series_key: series_key.to_string(),
            granularity,
        }
    }
}

/// 日线序列字段名
pub const DAILY_SERIES_KEY: &str = "Time Series (Daily)";
/// 小时线序列字段名
pub const HOURLY_SERIES_KEY: &str = "Time Series (60min)";

/// 默认数据源：美股日线、美股小时线、A 股日线、A 股小时线、加密货币日线
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new("merged.jsonl", DAILY_SERIES_KEY, Granularity::Daily),
        SourceConfig::new("merged_hourly.jsonl", HOURLY_SERIES_KEY, Granularity::Hourly),
        SourceConfig::new("A_stock/merged.jsonl", DAILY_SERIES_KEY, Granularity::Daily),
        SourceConfig::new("A_stock/merged_hourly.jsonl", HOURLY_SERIES_KEY, Granularity::Hourly),
        SourceConfig::new("crypto/crypto_merged.jsonl", DAILY_SERIES_KEY, Granularity::Daily),
    ]
}

/// 远端存储后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteBackend {
    Disabled,
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub backend: RemoteBackend,
    pub database_path: String,
    pub table: String,
    // 单次远端读取的超时上限
    pub timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            backend: RemoteBackend::Disabled,
            database_path: "data/remote/pricedata.db".to_string(),
            table: "pricedata".to_string(),
            timeout_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    // 固定的当前交易日；为空时每次从 TODAY_DATE 环境变量读取
    pub today_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    // 设置后额外写入按天滚动的日志文件
    pub dir: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}
