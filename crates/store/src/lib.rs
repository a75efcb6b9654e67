//! # `pricebook-store` - 远端存储适配器
//!
//! `RemoteStore` 端口的具体实现：禁用、内存 (`DashMap`) 与 SQLite (`sqlx`)。

pub mod disabled;
pub mod mem;
pub mod sqlite;
