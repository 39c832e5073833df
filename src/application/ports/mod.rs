//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod catalog_cache;
mod repositories;
mod unit_of_work;

pub use catalog_cache::{CatalogCachePort, CatalogSnapshot, ModuleWithChapters};
pub use repositories::{
    BudgetTotals, ChapterRecord, FundsMovementRecord, LedgerEntryRecord, ModuleRecord,
    NovelRecord, NovelRepositoryPort, RepositoryError,
};
pub use unit_of_work::{UnitOfWork, UnitOfWorkFactory};
