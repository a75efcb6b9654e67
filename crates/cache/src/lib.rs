//! # `pricebook-cache` - 行情内存缓存
//!
//! 将多个 JSONL 数据文件一次性加载为进程级内存索引，提供 O(1) 点查、
//! 远端存储回退以及当日数据脱敏。

pub mod admin;
pub mod index;
pub mod loader;
pub mod service;
