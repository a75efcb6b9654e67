use async_trait::async_trait;
use pricebook_core::store::error::StoreError;
use pricebook_core::store::port::{RemoteRow, RemoteStore};

/// # Summary
/// 未配置远端存储时使用的空实现。
///
/// # Invariants
/// - 读取永远返回不存在，写入永远失败。
/// - 调用方无需判断远端是否配置，只看读取是否有值。
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledRemoteStore;

#[async_trait]
impl RemoteStore for DisabledRemoteStore {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn fetch_row(
        &self,
        _partition_key: &str,
        _row_key: &str,
    ) -> Result<Option<RemoteRow>, StoreError> {
        Ok(None)
    }

    async fn upsert_row(&self, _row: &RemoteRow) -> Result<(), StoreError> {
        Err(StoreError::Unknown("remote store is disabled".to_string()))
    }
}
