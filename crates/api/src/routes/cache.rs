//! # 缓存管理路由控制器
//!
//! 提供缓存统计、全量重载以及向远端存储推送的能力。

use axum::Json;
use axum::extract::{Path, State};

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiResponse, CacheStatsResponse, PublishResponse};

/// 获取缓存统计
#[utoipa::path(
    get,
    path = "/api/v1/cache/stats",
    tag = "缓存管理 (Cache)",
    responses(
        (status = 200, description = "缓存统计", body = ApiResponse<CacheStatsResponse>),
        (status = 500, description = "索引加载失败")
    )
)]
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CacheStatsResponse>>, ApiError> {
    let stats = state.price_cache.stats().await?;
    Ok(Json(ApiResponse::ok(stats.into())))
}

/// 清空并重新加载缓存
///
/// 返回前新的索引已加载完成。
#[utoipa::path(
    post,
    path = "/api/v1/cache/refresh",
    tag = "缓存管理 (Cache)",
    responses(
        (status = 200, description = "重新加载后的统计", body = ApiResponse<CacheStatsResponse>),
        (status = 500, description = "索引加载失败")
    )
)]
pub async fn refresh_cache(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CacheStatsResponse>>, ApiError> {
    tracing::info!("Received cache refresh request");
    let stats = state.price_cache.refresh().await?;
    Ok(Json(ApiResponse::ok(stats.into())))
}

/// 将某标的的本地行情推送到远端存储
#[utoipa::path(
    post,
    path = "/api/v1/cache/publish/{symbol}",
    tag = "缓存管理 (Cache)",
    params(
        ("symbol" = String, Path, description = "标的代码")
    ),
    responses(
        (status = 200, description = "推送结果", body = ApiResponse<PublishResponse>),
        (status = 404, description = "本地数据中没有该标的"),
        (status = 503, description = "远端存储未启用")
    )
)]
pub async fn publish_symbol(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<PublishResponse>>, ApiError> {
    tracing::info!("Publishing {} to remote store", symbol);
    let report = state.price_cache.publish_symbol(&symbol).await?;
    Ok(Json(ApiResponse::ok(report.into())))
}
