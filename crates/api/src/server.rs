//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI、配置 CORS 并绑定 TCP 端口对外提供服务。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 的装配代码持有并调用。

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use pricebook_core::cache::port::PriceCache;

use crate::routes::{cache, price};

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - `price_cache` 在服务启动前由装配代码注入，生命周期与进程等同。
#[derive(Clone)]
pub struct AppState {
    /// 行情点查服务端口
    pub price_cache: Arc<dyn PriceCache>,
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

/// 全局 OpenAPI 文档结构
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pricebook 行情点查 API",
        version = "0.1.0",
        description = "按标的与日期查询单根历史 OHLCV 行情。本地 JSONL 数据优先，远端存储兜底，当日数据自动脱敏。",
        contact(name = "Pricebook Team"),
        license(name = "MIT")
    ),
    tags(
        (name = "行情 (Price)", description = "单根日线/小时线点查"),
        (name = "缓存管理 (Cache)", description = "缓存统计、重载与远端推送")
    )
)]
pub struct ApiDoc;

// ============================================================
//  服务构建与启动
// ============================================================

/// 构建完整的 axum 应用路由树 (含 Swagger UI 与 CORS)。
///
/// 测试可直接调用本函数，将路由挂到自行绑定的监听器上。
pub fn build_router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(price::get_price))
        .routes(routes!(cache::get_stats))
        .routes(routes!(cache::refresh_cache))
        .routes(routes!(cache::publish_symbol))
        .with_state(state)
        .split_for_parts();

    // 只读行情服务，允许所有来源
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// 构建路由并启动 HTTP 监听。
///
/// # Arguments
/// * `state` - 由装配代码注入的共享状态
/// * `bind_addr` - 监听的地址与端口，如 `"0.0.0.0:8003"`
///
/// # Returns
/// TCP 绑定失败或服务异常退出时返回错误。
pub async fn start_server(
    state: AppState,
    bind_addr: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(state);

    tracing::info!("🚀 Pricebook API Server listening on {}", bind_addr);
    tracing::info!("📖 Swagger UI: http://{}/swagger-ui/", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
