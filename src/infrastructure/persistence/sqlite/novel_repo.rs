//! SQLite Novel Repository - 只读查询

use async_trait::async_trait;
use sqlx::SqliteConnection;
use uuid::Uuid;

use super::database::{map_db_error, DbPool};
use super::rows::{
    ChapterRow, FundsRow, LedgerRow, ModuleRow, NovelRow, CHAPTER_COLUMNS, FUNDS_COLUMNS,
    LEDGER_COLUMNS, MODULE_COLUMNS, NOVEL_COLUMNS,
};
use crate::application::ports::{
    CatalogSnapshot, ChapterRecord, FundsMovementRecord, LedgerEntryRecord, ModuleRecord,
    NovelRecord, NovelRepositoryPort, RepositoryError,
};

/// SQLite Novel Repository
pub struct SqliteNovelRepository {
    pool: DbPool,
}

impl SqliteNovelRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

async fn fetch_novel(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> Result<Option<NovelRecord>, RepositoryError> {
    let row: Option<NovelRow> = sqlx::query_as(&format!(
        "SELECT {} FROM novels WHERE id = ?",
        NOVEL_COLUMNS
    ))
    .bind(id.to_string())
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?;

    row.map(NovelRecord::try_from).transpose()
}

/// 页码偏移量超出 i64 时按 i64::MAX 处理，结果为空页
fn sql_offset(offset: usize) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait]
impl NovelRepositoryPort for SqliteNovelRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<NovelRecord>, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_db_error)?;
        fetch_novel(&mut *conn, id).await
    }

    async fn load_catalog(
        &self,
        novel_id: Uuid,
    ) -> Result<Option<CatalogSnapshot>, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let Some(novel) = fetch_novel(&mut *tx, novel_id).await? else {
            tx.rollback().await.map_err(map_db_error)?;
            return Ok(None);
        };

        let modules: Vec<ModuleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM modules WHERE novel_id = ? ORDER BY sort_order",
            MODULE_COLUMNS
        ))
        .bind(novel_id.to_string())
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let chapters: Vec<ChapterRow> = sqlx::query_as(&format!(
            "SELECT {} FROM chapters c JOIN modules m ON m.id = c.module_id \
             WHERE c.novel_id = ? ORDER BY m.sort_order, c.sort_order",
            CHAPTER_COLUMNS
        ))
        .bind(novel_id.to_string())
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        let modules = modules
            .into_iter()
            .map(ModuleRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let chapters = chapters
            .into_iter()
            .map(ChapterRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(CatalogSnapshot::assemble(novel, modules, chapters)))
    }

    async fn ledger_history(
        &self,
        novel_id: Uuid,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LedgerEntryRecord>, RepositoryError> {
        let rows: Vec<LedgerRow> = sqlx::query_as(&format!(
            "SELECT {} FROM ledger_entries WHERE novel_id = ? ORDER BY rowid DESC LIMIT ? OFFSET ?",
            LEDGER_COLUMNS
        ))
        .bind(novel_id.to_string())
        .bind(sql_limit(limit))
        .bind(sql_offset(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(LedgerEntryRecord::try_from).collect()
    }

    async fn funds_movements(
        &self,
        novel_id: Uuid,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<FundsMovementRecord>, RepositoryError> {
        let rows: Vec<FundsRow> = sqlx::query_as(&format!(
            "SELECT {} FROM funds_movements WHERE novel_id = ? ORDER BY rowid DESC LIMIT ? OFFSET ?",
            FUNDS_COLUMNS
        ))
        .bind(novel_id.to_string())
        .bind(sql_limit(limit))
        .bind(sql_offset(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(FundsMovementRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{UnitOfWork, UnitOfWorkFactory};
    use crate::domain::catalog::{ChapterMode, ModuleMode};
    use crate::domain::funding::LedgerKind;
    use crate::infrastructure::persistence::sqlite::testing::TestDb;

    #[tokio::test]
    async fn test_load_catalog_reads_one_snapshot() {
        let db = TestDb::new().await;
        let novel_id = db.seed_novel(30).await;
        let module = db
            .seed_module(novel_id, "第一卷", 1, ModuleMode::Paid, 10)
            .await;
        db.seed_chapter(novel_id, module, "第一章", 1, ChapterMode::Paid, 5)
            .await;

        let repo = SqliteNovelRepository::new(db.pool.clone());
        let catalog = repo.load_catalog(novel_id).await.unwrap().unwrap();
        assert_eq!(catalog.novel.budget, 30);
        assert_eq!(catalog.modules.len(), 1);
        assert_eq!(catalog.modules[0].chapters.len(), 1);

        assert!(repo.load_catalog(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_with_huge_offset_is_empty() {
        let db = TestDb::new().await;
        let novel_id = db.seed_novel(0).await;

        let mut uow = db.factory().begin().await.unwrap();
        for amount in [10, 20] {
            let entry = LedgerEntryRecord::new(
                novel_id,
                Some(Uuid::new_v4()),
                amount,
                "贡献",
                amount,
                LedgerKind::User,
            );
            uow.append_ledger_entry(&entry).await.unwrap();
        }
        uow.commit().await.unwrap();

        let repo = SqliteNovelRepository::new(db.pool.clone());
        assert_eq!(repo.ledger_history(novel_id, 50, 0).await.unwrap().len(), 2);
        assert!(repo
            .ledger_history(novel_id, 50, usize::MAX)
            .await
            .unwrap()
            .is_empty());
        assert!(repo
            .funds_movements(novel_id, 50, usize::MAX)
            .await
            .unwrap()
            .is_empty());
    }
}
