use chrono::{DateTime, Utc};
use pricebook_core::common::Granularity;
use pricebook_core::config::SourceConfig;
use pricebook_core::market::entity::{Bar, Metadata, Series, SymbolRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// 文档中元数据对象的字段名
const META_FIELD: &str = "Meta Data";
/// 元数据中标的代码的字段名
const SYMBOL_FIELD: &str = "2. Symbol";

/// # Summary
/// 数据文件中单根行情的原始结构，字段名沿用数据源的编号约定。
///
/// # Invariants
/// - 只在加载边界使用，解析后立即转换为强类型 `Bar`。
#[derive(Debug, Deserialize)]
struct RawBar {
    #[serde(rename = "1. buy price", alias = "1. open", default, deserialize_with = "lenient_decimal")]
    open: Option<Decimal>,
    #[serde(rename = "2. high", default, deserialize_with = "lenient_decimal")]
    high: Option<Decimal>,
    #[serde(rename = "3. low", default, deserialize_with = "lenient_decimal")]
    low: Option<Decimal>,
    #[serde(rename = "4. sell price", alias = "4. close", default, deserialize_with = "lenient_decimal")]
    close: Option<Decimal>,
    #[serde(rename = "5. volume", default, deserialize_with = "lenient_decimal")]
    volume: Option<Decimal>,
}

impl From<RawBar> for Bar {
    fn from(raw: RawBar) -> Self {
        Bar {
            open: raw.open,
            high: raw.high,
            low: raw.low,
            close: raw.close,
            volume: raw.volume,
        }
    }
}

/// # Summary
/// 宽松的数值解析：接受字符串或 JSON 数字，无法识别时返回 None 而不是报错。
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => parse_decimal(s.trim()),
        Value::Number(n) => parse_decimal(&n.to_string()),
        _ => None,
    }))
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// # Summary
/// 一次完整加载得到的不可变索引快照。
///
/// # Invariants
/// - 构建完成后不再修改，通过 `Arc` 整体发布给读者。
#[derive(Debug, Default)]
pub struct IndexSnapshot {
    pub records: HashMap<String, SymbolRecord>,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl IndexSnapshot {
    pub fn get(&self, symbol: &str) -> Option<&SymbolRecord> {
        self.records.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// # Summary
/// 批量加载器：按固定顺序读取全部 JSONL 数据源并合并为索引快照。
#[derive(Debug, Clone)]
pub struct BulkLoader {
    // 数据根目录
    root: PathBuf,
    // 有序的数据源列表
    sources: Vec<SourceConfig>,
}

impl BulkLoader {
    pub fn new(root: impl Into<PathBuf>, sources: Vec<SourceConfig>) -> Self {
        Self {
            root: root.into(),
            sources,
        }
    }

    /// # Summary
    /// 依次加载全部数据源，构建一个新的快照。
    ///
    /// # Logic
    /// 1. 按配置顺序逐个调用 [`load_source`]，后加载的数据覆盖先加载的同键数据。
    /// 2. 记录每个数据源的文档数与最终的标的总数。
    ///
    /// # Returns
    /// 完整构建的 `IndexSnapshot`。
    pub fn load_all(&self) -> IndexSnapshot {
        info!("Loading price data into memory cache from {}", self.root.display());
        let mut records = HashMap::new();
        let mut documents = 0;

        for source in &self.sources {
            let path = self.root.join(&source.path);
            let count = load_source(&mut records, &path, &source.series_key, source.granularity);
            info!(
                "  Loaded {} symbol documents ({}) from {}",
                count,
                source.granularity,
                path.display()
            );
            documents += count;
        }

        info!(
            "Cache loaded: {} documents, {} unique symbols",
            documents,
            records.len()
        );

        IndexSnapshot {
            records,
            loaded_at: Some(Utc::now()),
        }
    }
}

/// # Summary
/// 将单个 JSONL 文件合并进记录表。
///
/// # Logic
/// 1. 文件不存在时记录 warn 并返回 0。
/// 2. 逐行解析；空行跳过，语法错误的行记录 warn 后跳过。
/// 3. 缺少标的代码的文档静默跳过；无法解析的单根行情记录 warn 后跳过。
/// 4. 首次遇到的标的以该文档的元数据创建记录。
/// 5. 将序列按键合并进对应粒度，键冲突时覆盖旧值。
///
/// # Arguments
/// * `records`: 正在构建的记录表。
/// * `path`: 数据文件路径。
/// * `series_key`: 时间序列对象的字段名。
/// * `granularity`: 合并的目标序列。
///
/// # Returns
/// 携带标的代码的文档数量。
pub fn load_source(
    records: &mut HashMap<String, SymbolRecord>,
    path: &Path,
    series_key: &str,
    granularity: Granularity,
) -> usize {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!("Data file not available: {} ({})", path.display(), e);
            return 0;
        }
    };

    let mut count = 0;
    for (line_no, line) in BufReader::new(file).split(b'\n').enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read {} at line {}: {}", path.display(), line_no + 1, e);
                break;
            }
        };
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match parse_document(&line, series_key) {
            Ok(Some((symbol, metadata, series))) => {
                records
                    .entry(symbol)
                    .or_insert_with(|| SymbolRecord::new(metadata))
                    .series_mut(granularity)
                    .extend(series);
                count += 1;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Failed to parse line {} in {}: {}", line_no + 1, path.display(), e);
            }
        }
    }

    count
}

/// # Summary
/// 解析一行文档。
///
/// # Returns
/// * `Ok(Some(..))` - 标的代码、元数据与序列。
/// * `Ok(None)` - 文档中没有标的代码。
/// * `Err(..)` - JSON 语法错误，或序列字段不是对象。
///
/// 单根行情结构不合法时只丢弃该条目，文档中其余行情照常保留。
fn parse_document(
    line: &[u8],
    series_key: &str,
) -> Result<Option<(String, Metadata, Series)>, serde_json::Error> {
    let mut doc: Value = serde_json::from_slice(line)?;

    let metadata = match doc.get_mut(META_FIELD).map(Value::take) {
        Some(Value::Object(map)) => map,
        _ => return Ok(None),
    };
    let symbol = match metadata.get(SYMBOL_FIELD).and_then(Value::as_str) {
        Some(symbol) if !symbol.is_empty() => symbol.to_string(),
        _ => return Ok(None),
    };

    let entries = match doc.get_mut(series_key).map(Value::take) {
        Some(Value::Null) | None => serde_json::Map::new(),
        Some(value) => serde_json::from_value::<serde_json::Map<String, Value>>(value)?,
    };

    let mut series = Series::with_capacity(entries.len());
    for (key, value) in entries {
        match serde_json::from_value::<RawBar>(value) {
            Ok(raw) => {
                series.insert(key, Bar::from(raw));
            }
            Err(e) => warn!("Skipping bar {} of {}: {}", key, symbol, e),
        }
    }

    Ok(Some((symbol, metadata, series)))
}
