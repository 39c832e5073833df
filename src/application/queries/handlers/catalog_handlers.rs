//! Catalog Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{CatalogCachePort, CatalogSnapshot, NovelRepositoryPort};
use crate::application::queries::GetNovelCatalog;

/// GetNovelCatalog Handler
///
/// 缓存命中时直接返回快照；未命中时在一个读事务中加载目录并写回缓存。
/// 读取期间发生的失效会使这次写回作废。
pub struct GetNovelCatalogHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    cache: Arc<dyn CatalogCachePort>,
}

impl GetNovelCatalogHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>, cache: Arc<dyn CatalogCachePort>) -> Self {
        Self { novel_repo, cache }
    }

    pub async fn handle(
        &self,
        query: GetNovelCatalog,
    ) -> Result<Arc<CatalogSnapshot>, ApplicationError> {
        if let Some(snapshot) = self.cache.get(query.novel_id) {
            return Ok(snapshot);
        }

        let generation = self.cache.generation(query.novel_id);
        let snapshot = self
            .novel_repo
            .load_catalog(query.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", query.novel_id))?;

        Ok(self.cache.put(snapshot, generation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::handlers::ContributeHandler;
    use crate::application::commands::Contribute;
    use crate::application::engine::{RetryPolicy, TransactionRunner};
    use crate::application::ports::{
        FundsMovementRecord, LedgerEntryRecord, NovelRecord, RepositoryError,
    };
    use crate::domain::catalog::{ChapterMode, ModuleMode};
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::memory::InMemoryCatalogCache;
    use crate::infrastructure::persistence::sqlite::testing::TestDb;
    use crate::infrastructure::persistence::SqliteNovelRepository;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use uuid::Uuid;

    /// 第一次加载目录后、返回之前提交一笔贡献
    struct ContributeDuringRead {
        inner: SqliteNovelRepository,
        contribute: ContributeHandler,
        fired: AtomicBool,
    }

    #[async_trait]
    impl NovelRepositoryPort for ContributeDuringRead {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<NovelRecord>, RepositoryError> {
            self.inner.find_by_id(id).await
        }

        async fn load_catalog(
            &self,
            novel_id: Uuid,
        ) -> Result<Option<CatalogSnapshot>, RepositoryError> {
            let snapshot = self.inner.load_catalog(novel_id).await?;
            if !self.fired.swap(true, Ordering::SeqCst) {
                self.contribute
                    .handle(Contribute {
                        novel_id,
                        user_id: Uuid::new_v4(),
                        amount: 10,
                        note: None,
                    })
                    .await
                    .unwrap();
            }
            Ok(snapshot)
        }

        async fn ledger_history(
            &self,
            novel_id: Uuid,
            limit: usize,
            offset: usize,
        ) -> Result<Vec<LedgerEntryRecord>, RepositoryError> {
            self.inner.ledger_history(novel_id, limit, offset).await
        }

        async fn funds_movements(
            &self,
            novel_id: Uuid,
            limit: usize,
            offset: usize,
        ) -> Result<Vec<FundsMovementRecord>, RepositoryError> {
            self.inner.funds_movements(novel_id, limit, offset).await
        }
    }

    #[tokio::test]
    async fn test_catalog_is_ordered_and_cached() {
        let db = TestDb::new().await;
        let novel_id = db.seed_novel(7).await;
        let second = db
            .seed_module(novel_id, "第二卷", 2, ModuleMode::Paid, 10)
            .await;
        let first = db
            .seed_module(novel_id, "第一卷", 1, ModuleMode::Published, 0)
            .await;
        db.seed_chapter(novel_id, first, "第二章", 2, ChapterMode::Paid, 5)
            .await;
        db.seed_chapter(novel_id, first, "第一章", 1, ChapterMode::Published, 0)
            .await;

        let cache = Arc::new(InMemoryCatalogCache::new(true));
        let handler = GetNovelCatalogHandler::new(
            Arc::new(SqliteNovelRepository::new(db.pool.clone())),
            cache.clone(),
        );

        let catalog = handler.handle(GetNovelCatalog { novel_id }).await.unwrap();
        assert_eq!(catalog.novel.budget, 7);
        assert_eq!(catalog.modules.len(), 2);
        assert_eq!(catalog.modules[0].module.id, first);
        assert_eq!(catalog.modules[1].module.id, second);
        let titles: Vec<&str> = catalog.modules[0]
            .chapters
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, vec!["第一章", "第二章"]);
        assert!(catalog.modules[1].chapters.is_empty());

        let again = handler.handle(GetNovelCatalog { novel_id }).await.unwrap();
        assert!(Arc::ptr_eq(&catalog, &again));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_novel_is_not_found() {
        let db = TestDb::new().await;
        let handler = GetNovelCatalogHandler::new(
            Arc::new(SqliteNovelRepository::new(db.pool.clone())),
            Arc::new(InMemoryCatalogCache::new(true)),
        );
        let err = handler
            .handle(GetNovelCatalog {
                novel_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_write_during_read_does_not_leave_stale_snapshot() {
        let db = TestDb::new().await;
        let novel_id = db.seed_novel(0).await;
        let module = db
            .seed_module(novel_id, "第一卷", 1, ModuleMode::Paid, 10)
            .await;

        let cache = Arc::new(InMemoryCatalogCache::new(true));
        let runner = Arc::new(TransactionRunner::new(db.factory(), RetryPolicy::default()));
        let repo = ContributeDuringRead {
            inner: SqliteNovelRepository::new(db.pool.clone()),
            contribute: ContributeHandler::new(runner, cache.clone(), EventPublisher::new(16).arc()),
            fired: AtomicBool::new(false),
        };
        let handler = GetNovelCatalogHandler::new(Arc::new(repo), cache.clone());

        let during = handler.handle(GetNovelCatalog { novel_id }).await.unwrap();
        assert_eq!(during.novel.balance, 0);
        assert!(cache.get(novel_id).is_none());
        assert_eq!(db.totals(novel_id).await, (0, 10));

        let after = handler.handle(GetNovelCatalog { novel_id }).await.unwrap();
        assert_eq!(after.novel.balance, 10);
        assert_eq!(after.novel.budget, 0);
        assert_eq!(after.modules[0].module.id, module);
        assert_eq!(after.modules[0].module.mode, ModuleMode::Published);

        let cached = cache.get(novel_id).unwrap();
        assert!(Arc::ptr_eq(&cached, &after));
    }
}
