//! Memory Layer - In-Memory State Management
//!
//! 目录读缓存的内存实现

mod catalog_cache;

pub use catalog_cache::InMemoryCatalogCache;
