//! Catalog Command Handlers - 小说、模块、章节的创建

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::{CreateChapter, CreateModule, CreateNovel};
use crate::application::engine::{rent, TransactionRunner};
use crate::application::error::ApplicationError;
use crate::application::ports::{CatalogCachePort, ChapterRecord, ModuleRecord, NovelRecord};
use crate::domain::catalog::{ModuleMode, Price, Title};

// ============================================================================
// CreateNovel
// ============================================================================

/// CreateNovel Handler
pub struct CreateNovelHandler {
    runner: Arc<TransactionRunner>,
}

impl CreateNovelHandler {
    pub fn new(runner: Arc<TransactionRunner>) -> Self {
        Self { runner }
    }

    pub async fn handle(&self, command: CreateNovel) -> Result<NovelRecord, ApplicationError> {
        let title = Title::new(command.title)?;
        let now = Utc::now();
        let novel = NovelRecord {
            id: Uuid::new_v4(),
            title: title.into_inner(),
            budget: 0,
            balance: 0,
            created_at: now,
            updated_at: now,
        };

        let record = novel.clone();
        self.runner
            .run("create_novel", move |uow| {
                let novel = record.clone();
                Box::pin(async move {
                    uow.insert_novel(&novel).await?;
                    Ok::<_, ApplicationError>(())
                })
            })
            .await?;

        tracing::info!(novel_id = %novel.id, title = %novel.title, "Novel created");
        Ok(novel)
    }
}

// ============================================================================
// CreateModule
// ============================================================================

/// CreateModule Handler
pub struct CreateModuleHandler {
    runner: Arc<TransactionRunner>,
    cache: Arc<dyn CatalogCachePort>,
}

impl CreateModuleHandler {
    pub fn new(runner: Arc<TransactionRunner>, cache: Arc<dyn CatalogCachePort>) -> Self {
        Self { runner, cache }
    }

    pub async fn handle(&self, command: CreateModule) -> Result<ModuleRecord, ApplicationError> {
        let title = Title::new(command.title)?;
        let price = Price::new(command.price)?;
        let now = Utc::now();
        let module = ModuleRecord {
            id: Uuid::new_v4(),
            novel_id: command.novel_id,
            title: title.into_inner(),
            order: command.order,
            mode: command.mode,
            price,
            rent_remaining_balance: 0,
            created_at: now,
            updated_at: now,
        };

        let record = module.clone();
        self.runner
            .run("create_module", move |uow| {
                let module = record.clone();
                Box::pin(async move {
                    uow.find_novel(module.novel_id)
                        .await?
                        .ok_or_else(|| ApplicationError::not_found("Novel", module.novel_id))?;
                    uow.insert_module(&module).await?;
                    Ok::<_, ApplicationError>(())
                })
            })
            .await?;

        self.cache.invalidate(module.novel_id);
        tracing::info!(
            novel_id = %module.novel_id,
            module_id = %module.id,
            order = module.order,
            mode = %module.mode,
            price = module.price.value(),
            "Module created"
        );
        Ok(module)
    }
}

// ============================================================================
// CreateChapter
// ============================================================================

/// CreateChapter Handler
///
/// 章节加入租借模块时在同一事务中重算模块的未解锁余额
pub struct CreateChapterHandler {
    runner: Arc<TransactionRunner>,
    cache: Arc<dyn CatalogCachePort>,
}

impl CreateChapterHandler {
    pub fn new(runner: Arc<TransactionRunner>, cache: Arc<dyn CatalogCachePort>) -> Self {
        Self { runner, cache }
    }

    pub async fn handle(&self, command: CreateChapter) -> Result<ChapterRecord, ApplicationError> {
        let title = Title::new(command.title)?;
        let price = Price::new(command.price)?;
        let chapter_id = Uuid::new_v4();
        let module_id = command.module_id;
        let order = command.order;
        let mode = command.mode;
        let title = title.into_inner();

        let chapter = self
            .runner
            .run("create_chapter", move |uow| {
                let title = title.clone();
                Box::pin(async move {
                    let module = uow
                        .find_module(module_id)
                        .await?
                        .ok_or_else(|| ApplicationError::not_found("Module", module_id))?;

                    let now = Utc::now();
                    let chapter = ChapterRecord {
                        id: chapter_id,
                        module_id,
                        novel_id: module.novel_id,
                        title,
                        order,
                        mode,
                        price,
                        created_at: now,
                        updated_at: now,
                    };
                    uow.insert_chapter(&chapter).await?;

                    if module.mode == ModuleMode::Rent {
                        rent::recalculate(uow, module_id).await?;
                    }
                    Ok::<_, ApplicationError>(chapter)
                })
            })
            .await?;

        self.cache.invalidate(chapter.novel_id);
        tracing::info!(
            novel_id = %chapter.novel_id,
            module_id = %chapter.module_id,
            chapter_id = %chapter.id,
            order = chapter.order,
            mode = %chapter.mode,
            price = chapter.price.value(),
            "Chapter created"
        );
        Ok(chapter)
    }
}
