//! # `pricebook-api` - HTTP API 网关
//!
//! 本 crate 是 Pricebook 行情点查服务的 HTTP/REST 入口。
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 接收调用方的点查与缓存管理请求
//! - 调用下层 `PriceCache` 端口完成业务操作
//! - 将领域模型转换为 DTO 返回给调用方

pub mod error;
pub mod routes;
pub mod server;
pub mod types;
