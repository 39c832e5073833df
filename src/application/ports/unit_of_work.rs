//! Unit of Work Port - 事务边界
//!
//! 所有写操作只能通过 UnitOfWork 完成，一个 UnitOfWork 对应一个数据库事务。
//! 未提交即丢弃的 UnitOfWork 会被回滚。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::repositories::{
    BudgetTotals, ChapterRecord, FundsMovementRecord, LedgerEntryRecord, ModuleRecord,
    NovelRecord, RepositoryError,
};
use crate::domain::catalog::{ChapterMode, ModuleMode};

/// 事务内的存储操作
#[async_trait]
pub trait UnitOfWork: Send {
    // ========== Novel ==========

    async fn find_novel(&mut self, id: Uuid) -> Result<Option<NovelRecord>, RepositoryError>;

    async fn insert_novel(&mut self, novel: &NovelRecord) -> Result<(), RepositoryError>;

    /// 原子地增加预算与余额（增量非负），返回新值
    ///
    /// 小说不存在或任一结果会超出 i64 时不做修改并返回 None
    async fn increment_funds(
        &mut self,
        novel_id: Uuid,
        budget_delta: i64,
        balance_delta: i64,
    ) -> Result<Option<BudgetTotals>, RepositoryError>;

    /// 仅当余额充足时原子地扣减余额；余额不足或小说不存在时返回 None
    async fn decrement_balance(
        &mut self,
        novel_id: Uuid,
        amount: i64,
    ) -> Result<Option<BudgetTotals>, RepositoryError>;

    /// 替换预算，返回替换前的值；小说不存在时返回 None
    async fn replace_budget(
        &mut self,
        novel_id: Uuid,
        budget: i64,
    ) -> Result<Option<i64>, RepositoryError>;

    /// 刷新 updated_at（用于 "最近更新" 排序）
    async fn touch_novel(&mut self, novel_id: Uuid, at: DateTime<Utc>)
        -> Result<(), RepositoryError>;

    // ========== Catalog ==========

    async fn find_module(&mut self, id: Uuid) -> Result<Option<ModuleRecord>, RepositoryError>;

    /// 小说的所有模块（order 升序）
    async fn list_modules(&mut self, novel_id: Uuid) -> Result<Vec<ModuleRecord>, RepositoryError>;

    /// 小说的所有章节（模块 order、章节 order 升序）
    async fn list_novel_chapters(
        &mut self,
        novel_id: Uuid,
    ) -> Result<Vec<ChapterRecord>, RepositoryError>;

    /// 模块内章节（order 升序）
    async fn list_module_chapters(
        &mut self,
        module_id: Uuid,
    ) -> Result<Vec<ChapterRecord>, RepositoryError>;

    async fn insert_module(&mut self, module: &ModuleRecord) -> Result<(), RepositoryError>;

    async fn insert_chapter(&mut self, chapter: &ChapterRecord) -> Result<(), RepositoryError>;

    async fn set_module_mode(&mut self, id: Uuid, mode: ModuleMode) -> Result<(), RepositoryError>;

    async fn set_chapter_mode(&mut self, id: Uuid, mode: ChapterMode)
        -> Result<(), RepositoryError>;

    async fn set_rent_remaining_balance(
        &mut self,
        module_id: Uuid,
        balance: i64,
    ) -> Result<(), RepositoryError>;

    // ========== Ledger ==========

    async fn append_ledger_entry(&mut self, entry: &LedgerEntryRecord)
        -> Result<(), RepositoryError>;

    async fn append_funds_movement(
        &mut self,
        movement: &FundsMovementRecord,
    ) -> Result<(), RepositoryError>;

    // ========== Lifecycle ==========

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// UnitOfWork 工厂（开启事务）
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError>;
}
