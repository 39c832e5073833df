//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Catalog Context: 小说 / 模块 / 章节目录
//! - Funding Context: 预算、余额与账本
//! - Unlock Context: 顺序自动解锁规则

pub mod catalog;
pub mod funding;
pub mod unlock;
