use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pricebook_core::common::Granularity;
use pricebook_core::store::error::StoreError;
use pricebook_core::store::port::{RemoteRow, RemoteStore};
use rust_decimal::Decimal;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// 单行查询结果: open, high, low, close, volume, data_type, timestamp
type RowTuple = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    DateTime<Utc>,
);

/// RemoteStore 的 SQLite 实现，模拟外部分区 KV 表。
///
/// # Summary
/// 所有标的共用一张表，以 (`partition_key`, `row_key`) 为主键。
///
/// # Invariants
/// * 价格与成交量以文本存储，保留原始精度。
/// * 表名在构造时校验，只允许字母、数字与下划线。
pub struct SqliteRemoteStore {
    pool: SqlitePool,
    table: String,
}

impl SqliteRemoteStore {
    /// 打开（或创建）远端行情表。
    ///
    /// # Logic
    /// 1. 校验表名，确保可以安全拼接进 SQL。
    /// 2. 确保数据库文件所在目录存在。
    /// 3. 连接数据库并执行建表 DDL。
    ///
    /// # Arguments
    /// * `path` - SQLite 数据库文件路径。
    /// * `table` - 表名。
    ///
    /// # Returns
    /// * `Result<Self, StoreError>` - 存储实例或初始化错误。
    pub async fn open(path: impl AsRef<Path>, table: &str) -> Result<Self, StoreError> {
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StoreError::InitError(format!("Invalid table name: {table}")));
        }

        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::InitError(e.to_string()))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| StoreError::InitError(e.to_string()))?;

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                partition_key TEXT NOT NULL,
                row_key TEXT NOT NULL,
                open TEXT,
                high TEXT,
                low TEXT,
                close TEXT,
                volume TEXT,
                data_type TEXT NOT NULL,
                timestamp DATETIME NOT NULL,
                PRIMARY KEY (partition_key, row_key)
            );
            "#
        ))
        .execute(&pool)
        .await
        .map_err(|e| StoreError::InitError(e.to_string()))?;

        info!("Remote store table `{}` ready at {}", table, path.display());
        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }
}

/// 文本列还原为数值，无法解析视为损坏
fn decode_decimal(column: &str, value: Option<String>) -> Result<Option<Decimal>, StoreError> {
    value
        .map(|text| {
            Decimal::from_str(&text)
                .map_err(|e| StoreError::Corrupt(format!("{column} = {text:?}: {e}")))
        })
        .transpose()
}

#[async_trait]
impl RemoteStore for SqliteRemoteStore {
    /// # Summary
    /// 按主键读取一行。
    ///
    /// # Logic
    /// 1. 执行主键查询。
    /// 2. 将文本列还原为 `Decimal`，数据类型列还原为 `Granularity`。
    async fn fetch_row(
        &self,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<RemoteRow>, StoreError> {
        let record = sqlx::query_as::<_, RowTuple>(&format!(
            r#"
            SELECT open, high, low, close, volume, data_type, timestamp
            FROM {}
            WHERE partition_key = ? AND row_key = ?
            "#,
            self.table
        ))
        .bind(partition_key)
        .bind(row_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        let Some((open, high, low, close, volume, data_type, timestamp)) = record else {
            return Ok(None);
        };

        Ok(Some(RemoteRow {
            partition_key: partition_key.to_string(),
            row_key: row_key.to_string(),
            open: decode_decimal("open", open)?,
            high: decode_decimal("high", high)?,
            low: decode_decimal("low", low)?,
            close: decode_decimal("close", close)?,
            volume: decode_decimal("volume", volume)?,
            data_type: data_type.parse::<Granularity>().map_err(StoreError::Corrupt)?,
            timestamp,
        }))
    }

    /// # Summary
    /// 写入或覆盖一行。
    ///
    /// # Logic
    /// 执行 `INSERT OR REPLACE`。
    async fn upsert_row(&self, row: &RemoteRow) -> Result<(), StoreError> {
        sqlx::query(&format!(
            r#"
            INSERT OR REPLACE INTO {} (partition_key, row_key, open, high, low, close, volume, data_type, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            self.table
        ))
        .bind(&row.partition_key)
        .bind(&row.row_key)
        .bind(row.open.map(|d| d.to_string()))
        .bind(row.high.map(|d| d.to_string()))
        .bind(row.low.map(|d| d.to_string()))
        .bind(row.close.map(|d| d.to_string()))
        .bind(row.volume.map(|d| d.to_string()))
        .bind(row.data_type.to_string())
        .bind(row.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}
