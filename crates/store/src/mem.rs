use async_trait::async_trait;
use dashmap::DashMap;
use pricebook_core::store::error::StoreError;
use pricebook_core::store::port::{RemoteRow, RemoteStore};

/// # Summary
/// 基于 DashMap 的内存远端存储实现。
///
/// # Invariants
/// - 所有操作均通过并发哈希表 `DashMap` 执行，保证多线程安全。
/// - 数据随进程退出而丢失，适用于测试与临时部署。
pub struct MemRemoteStore {
    // 以 (partition_key, row_key) 为键的行存储
    rows: DashMap<(String, String), RemoteRow>,
}

impl MemRemoteStore {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
        }
    }

    /// 当前存储的行数
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for MemRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for MemRemoteStore {
    /// # Summary
    /// 按主键读取一行。
    ///
    /// # Logic
    /// 从哈希表中检索主键对应的引用，并将其克隆为独立的所有权对象返回。
    async fn fetch_row(
        &self,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<RemoteRow>, StoreError> {
        let key = (partition_key.to_string(), row_key.to_string());
        Ok(self.rows.get(&key).map(|row| row.value().clone()))
    }

    /// # Summary
    /// 写入或覆盖一行。若存在同主键的行则覆盖。
    async fn upsert_row(&self, row: &RemoteRow) -> Result<(), StoreError> {
        self.rows.insert(
            (row.partition_key.clone(), row.row_key.clone()),
            row.clone(),
        );
        Ok(())
    }
}
