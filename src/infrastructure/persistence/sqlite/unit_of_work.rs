//! SQLite Unit of Work - 一个 UnitOfWork 持有一个 SQLite 事务

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

use super::database::{map_db_error, DbPool};
use super::rows::{
    ChapterRow, ModuleRow, NovelRow, CHAPTER_COLUMNS, MODULE_COLUMNS, NOVEL_COLUMNS,
};
use crate::application::ports::{
    BudgetTotals, ChapterRecord, FundsMovementRecord, LedgerEntryRecord, ModuleRecord,
    NovelRecord, RepositoryError, UnitOfWork, UnitOfWorkFactory,
};
use crate::domain::catalog::{ChapterMode, ModuleMode};

/// SQLite 事务工厂
pub struct SqliteUnitOfWorkFactory {
    pool: DbPool,
}

impl SqliteUnitOfWorkFactory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWorkFactory for SqliteUnitOfWorkFactory {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError> {
        let tx = self.pool.begin().await.map_err(map_db_error)?;
        Ok(Box::new(SqliteUnitOfWork { tx }))
    }
}

/// SQLite Unit of Work
///
/// 丢弃时若未提交，sqlx 会回滚事务
pub struct SqliteUnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

fn not_found(kind: &str, id: Uuid) -> RepositoryError {
    RepositoryError::NotFound(format!("{} {}", kind, id))
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    async fn find_novel(&mut self, id: Uuid) -> Result<Option<NovelRecord>, RepositoryError> {
        let row: Option<NovelRow> = sqlx::query_as(&format!(
            "SELECT {} FROM novels WHERE id = ?",
            NOVEL_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        row.map(NovelRecord::try_from).transpose()
    }

    async fn insert_novel(&mut self, novel: &NovelRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO novels (id, title, budget, balance, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(novel.id.to_string())
        .bind(&novel.title)
        .bind(novel.budget)
        .bind(novel.balance)
        .bind(novel.created_at.to_rfc3339())
        .bind(novel.updated_at.to_rfc3339())
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn increment_funds(
        &mut self,
        novel_id: Uuid,
        budget_delta: i64,
        balance_delta: i64,
    ) -> Result<Option<BudgetTotals>, RepositoryError> {
        let row: Option<(i64, i64)> = sqlx::query_as(
            r#"
            UPDATE novels
            SET budget = budget + ?, balance = balance + ?
            WHERE id = ?
              AND budget <= 9223372036854775807 - ?
              AND balance <= 9223372036854775807 - ?
            RETURNING budget, balance
            "#,
        )
        .bind(budget_delta)
        .bind(balance_delta)
        .bind(novel_id.to_string())
        .bind(budget_delta)
        .bind(balance_delta)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(|(budget, balance)| BudgetTotals { budget, balance }))
    }

    async fn decrement_balance(
        &mut self,
        novel_id: Uuid,
        amount: i64,
    ) -> Result<Option<BudgetTotals>, RepositoryError> {
        let row: Option<(i64, i64)> = sqlx::query_as(
            r#"
            UPDATE novels
            SET balance = balance - ?
            WHERE id = ? AND balance >= ?
            RETURNING budget, balance
            "#,
        )
        .bind(amount)
        .bind(novel_id.to_string())
        .bind(amount)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(|(budget, balance)| BudgetTotals { budget, balance }))
    }

    async fn replace_budget(
        &mut self,
        novel_id: Uuid,
        budget: i64,
    ) -> Result<Option<i64>, RepositoryError> {
        let previous: Option<(i64,)> = sqlx::query_as("SELECT budget FROM novels WHERE id = ?")
            .bind(novel_id.to_string())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        let Some((previous,)) = previous else {
            return Ok(None);
        };

        if previous != budget {
            sqlx::query("UPDATE novels SET budget = ? WHERE id = ?")
                .bind(budget)
                .bind(novel_id.to_string())
                .execute(&mut *self.tx)
                .await
                .map_err(map_db_error)?;
        }

        Ok(Some(previous))
    }

    async fn touch_novel(
        &mut self,
        novel_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE novels SET updated_at = ? WHERE id = ?")
            .bind(at.to_rfc3339())
            .bind(novel_id.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(not_found("Novel", novel_id));
        }
        Ok(())
    }

    async fn find_module(&mut self, id: Uuid) -> Result<Option<ModuleRecord>, RepositoryError> {
        let row: Option<ModuleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM modules WHERE id = ?",
            MODULE_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        row.map(ModuleRecord::try_from).transpose()
    }

    async fn list_modules(&mut self, novel_id: Uuid) -> Result<Vec<ModuleRecord>, RepositoryError> {
        let rows: Vec<ModuleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM modules WHERE novel_id = ? ORDER BY sort_order",
            MODULE_COLUMNS
        ))
        .bind(novel_id.to_string())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(ModuleRecord::try_from).collect()
    }

    async fn list_novel_chapters(
        &mut self,
        novel_id: Uuid,
    ) -> Result<Vec<ChapterRecord>, RepositoryError> {
        let rows: Vec<ChapterRow> = sqlx::query_as(&format!(
            "SELECT {} FROM chapters c JOIN modules m ON m.id = c.module_id \
             WHERE c.novel_id = ? ORDER BY m.sort_order, c.sort_order",
            CHAPTER_COLUMNS
        ))
        .bind(novel_id.to_string())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(ChapterRecord::try_from).collect()
    }

    async fn list_module_chapters(
        &mut self,
        module_id: Uuid,
    ) -> Result<Vec<ChapterRecord>, RepositoryError> {
        let rows: Vec<ChapterRow> = sqlx::query_as(&format!(
            "SELECT {} FROM chapters c WHERE c.module_id = ? ORDER BY c.sort_order",
            CHAPTER_COLUMNS
        ))
        .bind(module_id.to_string())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(ChapterRecord::try_from).collect()
    }

    async fn insert_module(&mut self, module: &ModuleRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO modules (id, novel_id, title, sort_order, mode, price, rent_remaining_balance, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(module.id.to_string())
        .bind(module.novel_id.to_string())
        .bind(&module.title)
        .bind(module.order)
        .bind(module.mode.as_str())
        .bind(module.price.value())
        .bind(module.rent_remaining_balance)
        .bind(module.created_at.to_rfc3339())
        .bind(module.updated_at.to_rfc3339())
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn insert_chapter(&mut self, chapter: &ChapterRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO chapters (id, module_id, novel_id, title, sort_order, mode, price, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(chapter.id.to_string())
        .bind(chapter.module_id.to_string())
        .bind(chapter.novel_id.to_string())
        .bind(&chapter.title)
        .bind(chapter.order)
        .bind(chapter.mode.as_str())
        .bind(chapter.price.value())
        .bind(chapter.created_at.to_rfc3339())
        .bind(chapter.updated_at.to_rfc3339())
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn set_module_mode(&mut self, id: Uuid, mode: ModuleMode) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE modules SET mode = ?, updated_at = ? WHERE id = ?")
            .bind(mode.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(not_found("Module", id));
        }
        Ok(())
    }

    async fn set_chapter_mode(
        &mut self,
        id: Uuid,
        mode: ChapterMode,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE chapters SET mode = ?, updated_at = ? WHERE id = ?")
            .bind(mode.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(not_found("Chapter", id));
        }
        Ok(())
    }

    async fn set_rent_remaining_balance(
        &mut self,
        module_id: Uuid,
        balance: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE modules SET rent_remaining_balance = ? WHERE id = ?")
            .bind(balance)
            .bind(module_id.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(not_found("Module", module_id));
        }
        Ok(())
    }

    async fn append_ledger_entry(
        &mut self,
        entry: &LedgerEntryRecord,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO ledger_entries (id, novel_id, user_id, amount, note, budget_after, kind, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.novel_id.to_string())
        .bind(entry.user_id.map(|id| id.to_string()))
        .bind(entry.amount)
        .bind(&entry.note)
        .bind(entry.budget_after)
        .bind(entry.kind.as_str())
        .bind(entry.created_at.to_rfc3339())
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn append_funds_movement(
        &mut self,
        movement: &FundsMovementRecord,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO funds_movements (id, novel_id, user_id, amount, direction, note, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(movement.id.to_string())
        .bind(movement.novel_id.to_string())
        .bind(movement.user_id.map(|id| id.to_string()))
        .bind(movement.amount)
        .bind(movement.direction.as_str())
        .bind(&movement.note)
        .bind(movement.created_at.to_rfc3339())
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await.map_err(map_db_error)
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.rollback().await.map_err(map_db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::TestDb;
    use super::*;
    use crate::domain::funding::LedgerKind;

    #[tokio::test]
    async fn test_increment_and_decrement_funds() {
        let db = TestDb::new().await;
        let novel_id = db.seed_novel(0).await;

        let mut uow = db.factory().begin().await.unwrap();
        let totals = uow.increment_funds(novel_id, 30, 30).await.unwrap().unwrap();
        assert_eq!(totals, BudgetTotals { budget: 30, balance: 30 });

        let totals = uow.increment_funds(novel_id, 0, 5).await.unwrap().unwrap();
        assert_eq!(totals, BudgetTotals { budget: 30, balance: 35 });

        assert!(uow.decrement_balance(novel_id, 100).await.unwrap().is_none());
        let totals = uow.decrement_balance(novel_id, 35).await.unwrap().unwrap();
        assert_eq!(totals.balance, 0);
        uow.commit().await.unwrap();

        assert_eq!(db.totals(novel_id).await, (30, 0));
    }

    #[tokio::test]
    async fn test_increment_unknown_novel_returns_none() {
        let db = TestDb::new().await;
        let mut uow = db.factory().begin().await.unwrap();
        assert!(uow
            .increment_funds(Uuid::new_v4(), 10, 10)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_replace_budget_returns_previous() {
        let db = TestDb::new().await;
        let novel_id = db.seed_novel(40).await;

        let mut uow = db.factory().begin().await.unwrap();
        assert_eq!(uow.replace_budget(novel_id, 15).await.unwrap(), Some(40));
        assert_eq!(uow.replace_budget(novel_id, 15).await.unwrap(), Some(15));
        uow.commit().await.unwrap();

        assert_eq!(db.totals(novel_id).await.0, 15);
    }

    #[tokio::test]
    async fn test_dropped_uow_rolls_back() {
        let db = TestDb::new().await;
        let novel_id = db.seed_novel(10).await;

        {
            let mut uow = db.factory().begin().await.unwrap();
            uow.increment_funds(novel_id, 90, 90).await.unwrap();
            uow.append_ledger_entry(&LedgerEntryRecord::new(
                novel_id,
                Some(Uuid::new_v4()),
                90,
                "contribution",
                100,
                LedgerKind::User,
            ))
            .await
            .unwrap();
        }

        assert_eq!(db.totals(novel_id).await, (10, 10));
        assert_eq!(db.ledger_count(novel_id).await, 0);
    }

    #[tokio::test]
    async fn test_chapters_ordered_by_module_then_chapter() {
        let db = TestDb::new().await;
        let novel_id = db.seed_novel(0).await;
        let second = db
            .seed_module(novel_id, "B", 2, ModuleMode::Paid, 10)
            .await;
        let first = db
            .seed_module(novel_id, "A", 1, ModuleMode::Paid, 10)
            .await;
        db.seed_chapter(novel_id, second, "B1", 1, ChapterMode::Paid, 1)
            .await;
        db.seed_chapter(novel_id, first, "A2", 2, ChapterMode::Paid, 1)
            .await;
        db.seed_chapter(novel_id, first, "A1", 1, ChapterMode::Paid, 1)
            .await;

        let mut uow = db.factory().begin().await.unwrap();
        let titles: Vec<String> = uow
            .list_novel_chapters(novel_id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["A1", "A2", "B1"]);

        let modules = uow.list_modules(novel_id).await.unwrap();
        assert_eq!(modules[0].id, first);
        assert_eq!(modules[1].id, second);
    }

    #[tokio::test]
    async fn test_duplicate_module_order_is_rejected() {
        let db = TestDb::new().await;
        let novel_id = db.seed_novel(0).await;
        db.seed_module(novel_id, "A", 1, ModuleMode::Paid, 10).await;

        let now = Utc::now();
        let duplicate = ModuleRecord {
            id: Uuid::new_v4(),
            novel_id,
            title: "A'".to_string(),
            order: 1,
            mode: ModuleMode::Paid,
            price: crate::domain::catalog::Price::ZERO,
            rent_remaining_balance: 0,
            created_at: now,
            updated_at: now,
        };
        let mut uow = db.factory().begin().await.unwrap();
        let err = uow.insert_module(&duplicate).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_set_mode_on_missing_row_is_not_found() {
        let db = TestDb::new().await;
        let mut uow = db.factory().begin().await.unwrap();
        let err = uow
            .set_chapter_mode(Uuid::new_v4(), ChapterMode::Published)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }
}
