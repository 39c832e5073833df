//! Ledger Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{FundsMovementRecord, LedgerEntryRecord, NovelRepositoryPort};
use crate::application::queries::{page, GetFundsLog, GetLedgerHistory};

/// GetLedgerHistory Handler
pub struct GetLedgerHistoryHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl GetLedgerHistoryHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(
        &self,
        query: GetLedgerHistory,
    ) -> Result<Vec<LedgerEntryRecord>, ApplicationError> {
        self.novel_repo
            .find_by_id(query.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", query.novel_id))?;

        let (limit, offset) = page(query.limit, query.offset);
        Ok(self
            .novel_repo
            .ledger_history(query.novel_id, limit, offset)
            .await?)
    }
}

/// GetFundsLog Handler
pub struct GetFundsLogHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl GetFundsLogHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(
        &self,
        query: GetFundsLog,
    ) -> Result<Vec<FundsMovementRecord>, ApplicationError> {
        self.novel_repo
            .find_by_id(query.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", query.novel_id))?;

        let (limit, offset) = page(query.limit, query.offset);
        Ok(self
            .novel_repo
            .funds_movements(query.novel_id, limit, offset)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{UnitOfWork, UnitOfWorkFactory};
    use crate::domain::funding::LedgerKind;
    use crate::infrastructure::persistence::sqlite::testing::TestDb;
    use crate::infrastructure::persistence::SqliteNovelRepository;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_history_is_newest_first_and_paged() {
        let db = TestDb::new().await;
        let novel_id = db.seed_novel(0).await;
        let user_id = Uuid::new_v4();

        let mut uow = db.factory().begin().await.unwrap();
        for amount in 1..=5 {
            uow.append_ledger_entry(&LedgerEntryRecord::new(
                novel_id,
                Some(user_id),
                amount,
                format!("#{}", amount),
                amount,
                LedgerKind::User,
            ))
            .await
            .unwrap();
        }
        uow.commit().await.unwrap();

        let handler =
            GetLedgerHistoryHandler::new(Arc::new(SqliteNovelRepository::new(db.pool.clone())));

        let all = handler
            .handle(GetLedgerHistory {
                novel_id,
                limit: None,
                offset: None,
            })
            .await
            .unwrap();
        let amounts: Vec<i64> = all.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![5, 4, 3, 2, 1]);

        let page = handler
            .handle(GetLedgerHistory {
                novel_id,
                limit: Some(2),
                offset: Some(1),
            })
            .await
            .unwrap();
        let amounts: Vec<i64> = page.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![4, 3]);
    }

    #[tokio::test]
    async fn test_funds_log_for_unknown_novel() {
        let db = TestDb::new().await;
        let handler =
            GetFundsLogHandler::new(Arc::new(SqliteNovelRepository::new(db.pool.clone())));
        let err = handler
            .handle(GetFundsLog {
                novel_id: Uuid::new_v4(),
                limit: None,
                offset: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }
}
