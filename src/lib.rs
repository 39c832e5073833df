//! Rovel Unlock - 小说众筹预算与顺序自动解锁服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Catalog Context: 小说 / 模块 / 章节目录与可见模式
//! - Funding Context: 预算、余额、账本条目与资金流水
//! - Unlock Context: 纯函数式的顺序解锁遍历与租借模块规则
//!
//! 应用层 (application/):
//! - Ports: UnitOfWork、只读仓储、目录缓存
//! - Engine: 事务执行器、预算访问、解锁引擎、租借余额重算
//! - Commands / Queries: CQRS 处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: JSON API + SSE
//! - Persistence: SQLite 存储
//! - Memory: 目录读缓存
//! - Events: 解锁与入账事件广播

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
