//! # `pricebook-core` - 领域内核
//!
//! 定义行情查询服务的实体、端口 (Trait) 与错误类型，不包含任何具体实现。
//! 具体的缓存、远端存储与 HTTP 网关分别位于 `pricebook-cache`、`pricebook-store`
//! 与 `pricebook-api` 中，由 `pricebook-app` 负责组装。

pub mod cache;
pub mod common;
pub mod config;
pub mod market;
pub mod store;
