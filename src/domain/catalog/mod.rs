//! Catalog Context - 内容目录限界上下文
//!
//! 职责:
//! - 小说 → 模块 → 章节 的有序树
//! - 可见模式与解锁价格

mod errors;
mod value_objects;

pub use errors::CatalogError;
pub use value_objects::{ChapterMode, ModuleMode, Price, Title};
