//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：处理所有读操作，不开启事务

mod catalog_queries;
mod ledger_queries;

pub mod handlers;

pub use catalog_queries::*;
pub use ledger_queries::{GetFundsLog, GetLedgerHistory, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
pub(crate) use ledger_queries::page;
