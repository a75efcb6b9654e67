use axum::Json;
use axum::extract::{Query, State};

use crate::server::AppState;
use crate::types::{PriceQuery, PriceResponse};

/// 查询单根历史行情
///
/// 根据日期格式自动选择日线 (`YYYY-MM-DD`) 或小时线 (`YYYY-MM-DD HH:MM:SS`)。
/// 格式错误、日期缺失、标的不存在均以 200 返回，响应体带 `error` 字段。
#[utoipa::path(
    get,
    path = "/api/v1/price",
    tag = "行情 (Price)",
    params(PriceQuery),
    responses(
        (status = 200, description = "查询结果（成功带 ohlcv，失败带 error）", body = PriceResponse)
    )
)]
pub async fn get_price(
    State(state): State<AppState>,
    Query(query): Query<PriceQuery>,
) -> Json<PriceResponse> {
    let outcome = state.price_cache.lookup(&query.symbol, &query.date).await;
    if let Err(e) = &outcome {
        tracing::debug!("Lookup {} @ {} failed: {}", query.symbol, query.date, e);
    }
    Json(PriceResponse::from_outcome(&query.symbol, &query.date, outcome))
}
