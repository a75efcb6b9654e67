use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use config::{Config, Environment, File};
use pricebook_api::server::{AppState, start_server};
use pricebook_cache::index::PriceIndex;
use pricebook_cache::loader::BulkLoader;
use pricebook_cache::service::PriceService;
use pricebook_core::common::time::{EnvToday, FixedToday, TodayProvider};
use pricebook_core::config::{AppConfig, LogConfig, RemoteBackend, RemoteConfig};
use pricebook_core::store::port::RemoteStore;
use pricebook_store::disabled::DisabledRemoteStore;
use pricebook_store::mem::MemRemoteStore;
use pricebook_store::sqlite::SqliteRemoteStore;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const CONFIG_FILE: &str = "config/pricebook";
const ENV_PREFIX: &str = "PRICEBOOK";

/// # Summary
/// 分层读取配置：内置默认值 → 可选配置文件 → `PRICEBOOK_` 前缀的环境变量。
///
/// # Arguments
/// * `file` - 配置文件路径 (不含扩展名)，文件不存在时跳过。
///
/// # Returns
/// * `Result<AppConfig, config::ConfigError>` - 合并后的配置。
fn load_config(file: &str) -> Result<AppConfig, config::ConfigError> {
    Config::builder()
        .add_source(Config::try_from(&AppConfig::default())?)
        .add_source(File::with_name(file).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// 安装全局日志。`RUST_LOG` 优先于配置中的级别。
///
/// 配置了日志目录时额外写入按天滚动的文件，返回的 guard 必须存活到进程退出。
fn init_logging(log: &LogConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));

    let (file_layer, guard) = match &log.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "pricebook.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}

/// 数据根目录必须存在，否则拒绝启动
fn check_data_root(root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !root.exists() {
        return Err(format!("Data root does not exist: {}", root.display()).into());
    }
    if !root.is_dir() {
        return Err(format!("Data root is not a directory: {}", root.display()).into());
    }
    Ok(())
}

/// 按配置的后端类型实例化远端存储
async fn build_remote(config: &RemoteConfig) -> Result<Arc<dyn RemoteStore>, Box<dyn std::error::Error>> {
    let remote: Arc<dyn RemoteStore> = match config.backend {
        RemoteBackend::Disabled => Arc::new(DisabledRemoteStore),
        RemoteBackend::Memory => Arc::new(MemRemoteStore::new()),
        RemoteBackend::Sqlite => {
            Arc::new(SqliteRemoteStore::open(&config.database_path, &config.table).await?)
        }
    };
    Ok(remote)
}

fn build_today(today_date: Option<&str>) -> Arc<dyn TodayProvider> {
    match today_date {
        Some(date) => Arc::new(FixedToday::new(date)),
        None => Arc::new(EnvToday::default()),
    }
}

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并通过 Arc<dyn Trait> 注入到 API 网关。
///
/// # Logic
/// 1. 读取分层配置并初始化全局日志。
/// 2. 校验数据根目录。
/// 3. 实例化远端存储与日期供给器。
/// 4. 构造查询服务并预热内存索引。
/// 5. 启动 HTTP 服务。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 配置与日志
    let config = load_config(CONFIG_FILE)?;
    let _log_guard = init_logging(&config.log);
    info!("Pricebook starting...");

    // 2. 数据根目录
    let root = Path::new(&config.data.root);
    check_data_root(root)?;

    // 3. 基础设施层
    let remote = build_remote(&config.remote).await?;
    if !remote.is_enabled() {
        warn!("Remote store disabled, lookups rely on local data only");
    }
    let today = build_today(config.market.today_date.as_deref());

    // 4. 查询服务，启动时预热
    let index = PriceIndex::new(BulkLoader::new(root, config.data.sources.clone()));
    let service = PriceService::new(index, remote, today)
        .with_remote_timeout(Duration::from_millis(config.remote.timeout_ms));
    service.index().ensure_loaded().await?;

    // 5. HTTP 网关
    let state = AppState {
        price_cache: Arc::new(service),
    };
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    start_server(state, &bind_addr).await?;

    Ok(())
}
