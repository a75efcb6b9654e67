use async_trait::async_trait;
use pricebook_cache::index::PriceIndex;
use pricebook_cache::loader::BulkLoader;
use pricebook_cache::service::PriceService;
use pricebook_core::cache::error::CacheError;
use pricebook_core::common::Granularity;
use pricebook_core::common::time::FixedToday;
use pricebook_core::config::default_sources;
use pricebook_core::market::entity::{
    Bar, OhlcvField, WITHHELD_CLOSE, WITHHELD_HIGH, WITHHELD_LOW, WITHHELD_VOLUME,
};
use pricebook_core::market::error::LookupError;
use pricebook_core::store::error::StoreError;
use pricebook_core::store::port::{RemoteRow, RemoteStore, RemoteStoreExt};
use pricebook_store::disabled::DisabledRemoteStore;
use pricebook_store::mem::MemRemoteStore;
use rust_decimal_macros::dec;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::Poll;
use std::time::Duration;
use tempfile::TempDir;

const TODAY: &str = "2025-10-30";

/// 记录读取次数的远端存储
struct CountingRemote {
    inner: MemRemoteStore,
    fetches: AtomicUsize,
}

impl CountingRemote {
    fn new() -> Self {
        Self {
            inner: MemRemoteStore::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteStore for CountingRemote {
    async fn fetch_row(&self, pk: &str, rk: &str) -> Result<Option<RemoteRow>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_row(pk, rk).await
    }

    async fn upsert_row(&self, row: &RemoteRow) -> Result<(), StoreError> {
        self.inner.upsert_row(row).await
    }
}

/// 永远不返回的远端存储，用于验证超时
struct StalledRemote;

#[async_trait]
impl RemoteStore for StalledRemote {
    async fn fetch_row(&self, _: &str, _: &str) -> Result<Option<RemoteRow>, StoreError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(None)
    }

    async fn upsert_row(&self, _: &RemoteRow) -> Result<(), StoreError> {
        Ok(())
    }
}

fn write_file(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body).unwrap();
}

fn fixture() -> TempDir {
    let tmp = tempfile::tempdir().unwrap();
    write_file(
        tmp.path(),
        "merged.jsonl",
        concat!(
            r#"{"Meta Data": {"2. Symbol": "IBM"}, "Time Series (Daily)": {"#,
            r#""2024-01-02": {"1. buy price": "160.0000", "2. high": "162.5000", "3. low": "159.2500", "4. sell price": "161.7500", "5. volume": "4120000"}, "#,
            r#""2024-01-03": {"1. buy price": "161.0000", "2. high": "161.9000", "3. low": "160.1000", "4. sell price": "160.9000", "5. volume": null}, "#,
            r#""2025-10-30": {"1. buy price": "250.0000", "2. high": "255.0000", "3. low": "249.0000", "4. sell price": "254.0000", "5. volume": "3000000"}}}"#,
            "\n",
            r#"{"Meta Data": {"2. Symbol": "NOBARS"}, "Time Series (Daily)": {}}"#,
            "\n",
        ),
    );
    write_file(
        tmp.path(),
        "merged_hourly.jsonl",
        concat!(
            r#"{"Meta Data": {"2. Symbol": "IBM"}, "Time Series (60min)": {"#,
            r#""2025-10-30 14:30:00": {"1. buy price": "251.1000", "2. high": "252.0000", "3. low": "250.5000", "4. sell price": "251.8000", "5. volume": "120000"}}}"#,
            "\n",
        ),
    );
    tmp
}

fn service(root: &Path, remote: Arc<dyn RemoteStore>) -> PriceService {
    let index = PriceIndex::new(BulkLoader::new(root, default_sources()));
    PriceService::new(index, remote, Arc::new(FixedToday::new(TODAY)))
}

fn remote_bar() -> Bar {
    Bar {
        open: Some(dec!(10.5)),
        high: Some(dec!(11)),
        low: Some(dec!(10)),
        close: Some(dec!(10.8)),
        volume: Some(dec!(500)),
    }
}

#[tokio::test]
async fn test_loaded_bar_round_trips_verbatim() {
    let tmp = fixture();
    let service = service(tmp.path(), Arc::new(DisabledRemoteStore));

    let quote = service.lookup("IBM", "2024-01-02").await.unwrap();
    assert_eq!(quote.symbol, "IBM");
    assert_eq!(quote.date, "2024-01-02");
    assert_eq!(quote.ohlcv.open, Some(dec!(160.0000)));
    assert_eq!(quote.ohlcv.high, OhlcvField::Value(Some(dec!(162.5))));
    assert_eq!(quote.ohlcv.low, OhlcvField::Value(Some(dec!(159.25))));
    assert_eq!(quote.ohlcv.close, OhlcvField::Value(Some(dec!(161.75))));
    assert_eq!(quote.ohlcv.volume, OhlcvField::Value(Some(dec!(4120000))));

    let json = serde_json::to_value(&quote).unwrap();
    assert_eq!(json["ohlcv"]["open"], "160.0000");

    let quote = service.lookup("IBM", "2024-01-03").await.unwrap();
    assert_eq!(quote.ohlcv.volume, OhlcvField::Value(None));
}

#[tokio::test]
async fn test_today_is_redacted() {
    let tmp = fixture();
    let service = service(tmp.path(), Arc::new(DisabledRemoteStore));

    let quote = service.lookup("IBM", TODAY).await.unwrap();
    assert_eq!(quote.ohlcv.open, Some(dec!(250)));
    assert_eq!(quote.ohlcv.high, OhlcvField::withheld(WITHHELD_HIGH));
    assert_eq!(quote.ohlcv.low, OhlcvField::withheld(WITHHELD_LOW));
    assert_eq!(quote.ohlcv.close, OhlcvField::withheld(WITHHELD_CLOSE));
    assert_eq!(quote.ohlcv.volume, OhlcvField::withheld(WITHHELD_VOLUME));

    // 小时线时间戳与日期不完全相等，不脱敏
    let quote = service.lookup("IBM", "2025-10-30 14:30:00").await.unwrap();
    assert_eq!(quote.ohlcv.close, OhlcvField::Value(Some(dec!(251.8))));
}

#[tokio::test]
async fn test_format_error_touches_nothing() {
    let tmp = fixture();
    let remote = Arc::new(CountingRemote::new());
    let service = service(tmp.path(), remote.clone());

    let err = service.lookup("IBM", "2025-13-40").await.unwrap_err();
    assert_eq!(err, LookupError::InvalidFormat { expected: "YYYY-MM-DD" });
    assert_eq!(err.to_string(), "date must be in YYYY-MM-DD format");

    let err = service.lookup("IBM", "2025-10-30T14:30:00").await.unwrap_err();
    assert_eq!(err.to_string(), "date must be in YYYY-MM-DD HH:MM:SS format");

    assert!(!service.index().is_loaded());
    assert_eq!(service.index().load_runs(), 0);
    assert_eq!(remote.fetches(), 0);
}

#[tokio::test]
async fn test_granularity_routing() {
    let tmp = fixture();
    let service = service(tmp.path(), Arc::new(DisabledRemoteStore));

    let hourly = service.lookup("IBM", "2025-10-30 14:30:00").await.unwrap();
    assert_eq!(hourly.ohlcv.open, Some(dec!(251.1)));

    let daily = service.lookup("IBM", "2025-10-30").await.unwrap();
    assert_eq!(daily.ohlcv.open, Some(dec!(250)));

    // 显式入口按各自格式校验
    assert!(service.lookup_hourly("IBM", "2025-10-30").await.is_err());
    assert!(service.lookup_daily("IBM", "2025-10-30").await.is_ok());
}

#[tokio::test]
async fn test_missing_date_returns_samples_without_remote() {
    let tmp = fixture();
    let remote = Arc::new(CountingRemote::new());
    assert!(remote.put("IBM", "2024-01-05", &remote_bar(), Granularity::Daily).await);
    let service = service(tmp.path(), remote.clone());

    let err = service.lookup("IBM", "2024-01-05").await.unwrap_err();
    assert_eq!(
        err,
        LookupError::DateNotFound {
            date: "2024-01-05".to_string(),
            samples: vec![
                "2025-10-30".to_string(),
                "2024-01-03".to_string(),
                "2024-01-02".to_string(),
            ],
        }
    );
    assert!(err.to_string().starts_with("Data not found for date 2024-01-05."));
    assert_eq!(remote.fetches(), 0);
}

#[tokio::test]
async fn test_unknown_symbol_falls_back_to_remote() {
    let tmp = fixture();
    let remote = Arc::new(CountingRemote::new());
    assert!(remote.put("MSFT", "2024-01-02", &remote_bar(), Granularity::Daily).await);
    assert!(remote.put("MSFT", TODAY, &remote_bar(), Granularity::Daily).await);
    let row_key = Granularity::Hourly.row_key("2024-01-02 10:00:00");
    assert!(remote.put("MSFT", &row_key, &remote_bar(), Granularity::Hourly).await);
    let service = service(tmp.path(), remote.clone());

    let quote = service.lookup("MSFT", "2024-01-02").await.unwrap();
    assert_eq!(quote.symbol, "MSFT");
    assert_eq!(quote.ohlcv.close, OhlcvField::Value(Some(dec!(10.8))));

    let quote = service.lookup("MSFT", "2024-01-02 10:00:00").await.unwrap();
    assert_eq!(quote.ohlcv.volume, OhlcvField::Value(Some(dec!(500))));

    let quote = service.lookup("MSFT", TODAY).await.unwrap();
    assert_eq!(quote.ohlcv.open, Some(dec!(10.5)));
    assert_eq!(quote.ohlcv.close, OhlcvField::withheld(WITHHELD_CLOSE));

    assert_eq!(remote.fetches(), 3);
}

#[tokio::test]
async fn test_empty_series_falls_back_to_remote() {
    let tmp = fixture();
    let remote = Arc::new(CountingRemote::new());
    assert!(remote.put("NOBARS", "2024-01-02", &remote_bar(), Granularity::Daily).await);
    let service = service(tmp.path(), remote.clone());

    let quote = service.lookup("NOBARS", "2024-01-02").await.unwrap();
    assert_eq!(quote.ohlcv.open, Some(dec!(10.5)));
    assert_eq!(remote.fetches(), 1);
}

#[tokio::test]
async fn test_unknown_everywhere() {
    let tmp = fixture();
    let service = service(tmp.path(), Arc::new(CountingRemote::new()));

    let err = service.lookup("NOPE", "2024-01-02").await.unwrap_err();
    assert_eq!(err.to_string(), "No records found for stock NOPE in local data");

    // 代码大小写敏感
    let err = service.lookup("ibm", "2024-01-02").await.unwrap_err();
    assert!(matches!(err, LookupError::SymbolNotFound { .. }));
}

#[tokio::test]
async fn test_remote_timeout_is_a_miss() {
    let tmp = fixture();
    let service = service(tmp.path(), Arc::new(StalledRemote))
        .with_remote_timeout(Duration::from_millis(50));

    let started = std::time::Instant::now();
    let err = service.lookup("MSFT", "2024-01-02").await.unwrap_err();
    assert!(matches!(err, LookupError::SymbolNotFound { .. }));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_ensure_loaded_runs_once() {
    let tmp = fixture();
    let service = Arc::new(service(tmp.path(), Arc::new(DisabledRemoteStore)));

    let mut handles = Vec::new();
    for i in 0..32 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                service.index().ensure_loaded().await.unwrap();
            } else {
                let quote = service.lookup("IBM", "2024-01-02").await.unwrap();
                assert_eq!(quote.ohlcv.open, Some(dec!(160)));
            }
            service.index().snapshot().await.len()
        }));
    }

    for handle in handles {
        // 任何调用方都不会看到未填充完的索引
        assert_eq!(handle.await.unwrap(), 2);
    }
    assert_eq!(service.index().load_runs(), 1);
}

/// 轮询一次后丢弃 future，模拟调用方中途断开
async fn poll_once_then_drop<F: Future>(future: F) {
    let mut future = Box::pin(future);
    std::future::poll_fn(|cx| {
        assert!(future.as_mut().poll(cx).is_pending());
        Poll::Ready(())
    })
    .await;
}

#[tokio::test]
async fn test_abandoned_load_still_publishes() {
    let tmp = fixture();
    let service = service(tmp.path(), Arc::new(DisabledRemoteStore));

    // 只轮询一次就丢弃，加载任务此时尚未完成
    poll_once_then_drop(service.index().ensure_loaded()).await;
    assert!(!service.index().is_loaded());

    tokio::time::timeout(Duration::from_secs(5), async {
        while !service.index().is_loaded() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(service.index().load_runs(), 1);
    assert_eq!(service.index().snapshot().await.len(), 2);

    // 后续调用直接复用已发布的快照
    service.index().ensure_loaded().await.unwrap();
    assert!(service.lookup("IBM", "2024-01-02").await.is_ok());
    assert_eq!(service.index().load_runs(), 1);

    poll_once_then_drop(service.reset()).await;
    service.index().ensure_loaded().await.unwrap();
    assert_eq!(service.index().load_runs(), 2);
}

#[tokio::test]
async fn test_reset_reloads_from_sources() {
    let tmp = fixture();
    let service = service(tmp.path(), Arc::new(DisabledRemoteStore));

    let stats = service.stats().await.unwrap();
    assert!(stats.cache_loaded);
    assert_eq!(stats.total_symbols, 2);
    assert_eq!(stats.total_daily_entries, 3);
    assert_eq!(stats.total_hourly_entries, 1);
    assert!(!stats.remote_enabled);
    assert_eq!(stats.symbols, vec!["IBM", "NOBARS"]);

    write_file(
        tmp.path(),
        "crypto/crypto_merged.jsonl",
        r#"{"Meta Data": {"2. Symbol": "BTC"}, "Time Series (Daily)": {"2025-01-01": {"4. sell price": "94000"}}}"#,
    );
    // 未重置前不会重新读取
    assert!(service.lookup("BTC", "2025-01-01").await.is_err());

    let stats = service.reset().await.unwrap();
    assert!(stats.cache_loaded);
    assert_eq!(stats.total_symbols, 3);
    assert_eq!(stats.total_daily_entries, 4);
    assert_eq!(service.index().load_runs(), 2);
    assert!(service.lookup("BTC", "2025-01-01").await.is_ok());
}

#[tokio::test]
async fn test_stats_symbol_sample_is_bounded() {
    let tmp = tempfile::tempdir().unwrap();
    let body: String = (0..25)
        .map(|i| format!("{{\"Meta Data\": {{\"2. Symbol\": \"S{i:02}\"}}}}\n"))
        .collect();
    write_file(tmp.path(), "merged.jsonl", &body);
    let service = service(tmp.path(), Arc::new(DisabledRemoteStore));

    let stats = service.stats().await.unwrap();
    assert_eq!(stats.total_symbols, 25);
    assert_eq!(stats.symbols.len(), 20);
    assert_eq!(stats.symbols.first().map(String::as_str), Some("S00"));
    assert_eq!(stats.total_daily_entries, 0);
}

#[tokio::test]
async fn test_publish_symbol_writes_every_bar() {
    let tmp = fixture();
    let remote = Arc::new(MemRemoteStore::new());
    let service = service(tmp.path(), remote.clone());

    let report = service.publish_symbol("IBM").await.unwrap();
    assert_eq!(report.symbol, "IBM");
    assert_eq!(report.written, 4);
    assert_eq!(report.failed, 0);
    assert_eq!(remote.len(), 4);

    let row = remote.get("IBM", "hourly_2025-10-30 14:30:00").await.unwrap();
    assert_eq!(row.data_type, Granularity::Hourly);
    assert_eq!(row.open, Some(dec!(251.1)));

    let err = service.publish_symbol("NOPE").await.unwrap_err();
    assert!(matches!(err, CacheError::SymbolNotFound(_)));
}

#[tokio::test]
async fn test_publish_requires_remote() {
    let tmp = fixture();
    let service = service(tmp.path(), Arc::new(DisabledRemoteStore));
    let err = service.publish_symbol("IBM").await.unwrap_err();
    assert!(matches!(err, CacheError::RemoteDisabled));
}
