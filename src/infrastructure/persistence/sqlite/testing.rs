//! 测试辅助：临时数据库、目录种子数据与故障注入

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

use super::database::{create_pool, run_migrations, DatabaseConfig, DbPool};
use super::unit_of_work::SqliteUnitOfWorkFactory;
use crate::application::ports::{
    BudgetTotals, ChapterRecord, FundsMovementRecord, LedgerEntryRecord, ModuleRecord,
    NovelRecord, RepositoryError, UnitOfWork, UnitOfWorkFactory,
};
use crate::domain::catalog::{ChapterMode, ModuleMode, Price};

/// 基于临时文件的数据库，允许多个连接同时读写
pub(crate) struct TestDb {
    _dir: TempDir,
    pub pool: DbPool,
}

impl TestDb {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = DatabaseConfig::new(dir.path().join("test.db"));
        let pool = create_pool(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();
        Self { _dir: dir, pool }
    }

    pub fn factory(&self) -> Arc<dyn UnitOfWorkFactory> {
        Arc::new(SqliteUnitOfWorkFactory::new(self.pool.clone()))
    }

    pub async fn seed_novel(&self, budget: i64) -> Uuid {
        let now = Utc::now();
        let novel = NovelRecord {
            id: Uuid::new_v4(),
            title: "Test Novel".to_string(),
            budget,
            balance: budget,
            created_at: now,
            updated_at: now,
        };
        let mut uow = self.factory().begin().await.unwrap();
        uow.insert_novel(&novel).await.unwrap();
        uow.commit().await.unwrap();
        novel.id
    }

    pub async fn seed_module(
        &self,
        novel_id: Uuid,
        title: &str,
        order: i64,
        mode: ModuleMode,
        price: i64,
    ) -> Uuid {
        let now = Utc::now();
        let module = ModuleRecord {
            id: Uuid::new_v4(),
            novel_id,
            title: title.to_string(),
            order,
            mode,
            price: Price::new(price).unwrap(),
            rent_remaining_balance: 0,
            created_at: now,
            updated_at: now,
        };
        let mut uow = self.factory().begin().await.unwrap();
        uow.insert_module(&module).await.unwrap();
        uow.commit().await.unwrap();
        module.id
    }

    pub async fn seed_chapter(
        &self,
        novel_id: Uuid,
        module_id: Uuid,
        title: &str,
        order: i64,
        mode: ChapterMode,
        price: i64,
    ) -> Uuid {
        let now = Utc::now();
        let chapter = ChapterRecord {
            id: Uuid::new_v4(),
            module_id,
            novel_id,
            title: title.to_string(),
            order,
            mode,
            price: Price::new(price).unwrap(),
            created_at: now,
            updated_at: now,
        };
        let mut uow = self.factory().begin().await.unwrap();
        uow.insert_chapter(&chapter).await.unwrap();
        uow.commit().await.unwrap();
        chapter.id
    }

    pub async fn module_mode(&self, id: Uuid) -> String {
        let (mode,): (String,) = sqlx::query_as("SELECT mode FROM modules WHERE id = ?")
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await
            .unwrap();
        mode
    }

    pub async fn chapter_mode(&self, id: Uuid) -> String {
        let (mode,): (String,) = sqlx::query_as("SELECT mode FROM chapters WHERE id = ?")
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await
            .unwrap();
        mode
    }

    pub async fn totals(&self, novel_id: Uuid) -> (i64, i64) {
        sqlx::query_as("SELECT budget, balance FROM novels WHERE id = ?")
            .bind(novel_id.to_string())
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn ledger_count(&self, novel_id: Uuid) -> i64 {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM ledger_entries WHERE novel_id = ?")
                .bind(novel_id.to_string())
                .fetch_one(&self.pool)
                .await
                .unwrap();
        count
    }

    pub async fn movement_count(&self, novel_id: Uuid) -> i64 {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM funds_movements WHERE novel_id = ?")
                .bind(novel_id.to_string())
                .fetch_one(&self.pool)
                .await
                .unwrap();
        count
    }

    pub async fn updated_at(&self, novel_id: Uuid) -> String {
        let (updated_at,): (String,) =
            sqlx::query_as("SELECT updated_at FROM novels WHERE id = ?")
                .bind(novel_id.to_string())
                .fetch_one(&self.pool)
                .await
                .unwrap();
        updated_at
    }
}

/// 在第 N 次模式翻转时注入存储故障的 UnitOfWork
pub(crate) struct FailingUnitOfWork {
    inner: Box<dyn UnitOfWork>,
    flips: Arc<AtomicUsize>,
    fail_at: usize,
    error: fn() -> RepositoryError,
}

impl FailingUnitOfWork {
    fn flip(&mut self) -> Result<(), RepositoryError> {
        let n = self.flips.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_at {
            return Err((self.error)());
        }
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for FailingUnitOfWork {
    async fn find_novel(&mut self, id: Uuid) -> Result<Option<NovelRecord>, RepositoryError> {
        self.inner.find_novel(id).await
    }

    async fn insert_novel(&mut self, novel: &NovelRecord) -> Result<(), RepositoryError> {
        self.inner.insert_novel(novel).await
    }

    async fn increment_funds(
        &mut self,
        novel_id: Uuid,
        budget_delta: i64,
        balance_delta: i64,
    ) -> Result<Option<BudgetTotals>, RepositoryError> {
        self.inner
            .increment_funds(novel_id, budget_delta, balance_delta)
            .await
    }

    async fn decrement_balance(
        &mut self,
        novel_id: Uuid,
        amount: i64,
    ) -> Result<Option<BudgetTotals>, RepositoryError> {
        self.inner.decrement_balance(novel_id, amount).await
    }

    async fn replace_budget(
        &mut self,
        novel_id: Uuid,
        budget: i64,
    ) -> Result<Option<i64>, RepositoryError> {
        self.inner.replace_budget(novel_id, budget).await
    }

    async fn touch_novel(
        &mut self,
        novel_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.inner.touch_novel(novel_id, at).await
    }

    async fn find_module(&mut self, id: Uuid) -> Result<Option<ModuleRecord>, RepositoryError> {
        self.inner.find_module(id).await
    }

    async fn list_modules(&mut self, novel_id: Uuid) -> Result<Vec<ModuleRecord>, RepositoryError> {
        self.inner.list_modules(novel_id).await
    }

    async fn list_novel_chapters(
        &mut self,
        novel_id: Uuid,
    ) -> Result<Vec<ChapterRecord>, RepositoryError> {
        self.inner.list_novel_chapters(novel_id).await
    }

    async fn list_module_chapters(
        &mut self,
        module_id: Uuid,
    ) -> Result<Vec<ChapterRecord>, RepositoryError> {
        self.inner.list_module_chapters(module_id).await
    }

    async fn insert_module(&mut self, module: &ModuleRecord) -> Result<(), RepositoryError> {
        self.inner.insert_module(module).await
    }

    async fn insert_chapter(&mut self, chapter: &ChapterRecord) -> Result<(), RepositoryError> {
        self.inner.insert_chapter(chapter).await
    }

    async fn set_module_mode(&mut self, id: Uuid, mode: ModuleMode) -> Result<(), RepositoryError> {
        self.flip()?;
        self.inner.set_module_mode(id, mode).await
    }

    async fn set_chapter_mode(
        &mut self,
        id: Uuid,
        mode: ChapterMode,
    ) -> Result<(), RepositoryError> {
        self.flip()?;
        self.inner.set_chapter_mode(id, mode).await
    }

    async fn set_rent_remaining_balance(
        &mut self,
        module_id: Uuid,
        balance: i64,
    ) -> Result<(), RepositoryError> {
        self.inner.set_rent_remaining_balance(module_id, balance).await
    }

    async fn append_ledger_entry(
        &mut self,
        entry: &LedgerEntryRecord,
    ) -> Result<(), RepositoryError> {
        self.inner.append_ledger_entry(entry).await
    }

    async fn append_funds_movement(
        &mut self,
        movement: &FundsMovementRecord,
    ) -> Result<(), RepositoryError> {
        self.inner.append_funds_movement(movement).await
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        self.inner.rollback().await
    }
}

/// 产出 FailingUnitOfWork 的工厂；计数在所有事务间共享
pub(crate) struct FailingFactory {
    inner: Arc<dyn UnitOfWorkFactory>,
    pub flips: Arc<AtomicUsize>,
    fail_at: usize,
    error: fn() -> RepositoryError,
}

impl FailingFactory {
    /// 第 `fail_at` 次模式翻转时返回不可重试的数据库错误
    pub fn database_error_at(inner: Arc<dyn UnitOfWorkFactory>, fail_at: usize) -> Self {
        Self {
            inner,
            flips: Arc::new(AtomicUsize::new(0)),
            fail_at,
            error: || RepositoryError::DatabaseError("injected failure".to_string()),
        }
    }

    /// 第 `fail_at` 次模式翻转时返回写锁冲突
    pub fn busy_at(inner: Arc<dyn UnitOfWorkFactory>, fail_at: usize) -> Self {
        Self {
            inner,
            flips: Arc::new(AtomicUsize::new(0)),
            fail_at,
            error: || RepositoryError::Busy("database is locked".to_string()),
        }
    }
}

#[async_trait]
impl UnitOfWorkFactory for FailingFactory {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError> {
        let inner = self.inner.begin().await?;
        Ok(Box::new(FailingUnitOfWork {
            inner,
            flips: self.flips.clone(),
            fail_at: self.fail_at,
            error: self.error,
        }))
    }
}
