//! Sequential Unlock Engine
//!
//! 在调用方的事务中执行一次完整的解锁遍历：
//! 1. 预算 <= 0 时直接返回，不做任何写入
//! 2. 在目录快照上运行 `UnlockWalker`，逐项翻转模式并写入系统账本条目
//! 3. 对本轮有章节被解锁的租借模块重新计算余额并检查自动切换
//! 4. 持久化剩余预算；有解锁时刷新 updated_at
//!
//! 引擎本身不做事务之外的 I/O，缓存失效与事件推送由调用方根据返回值完成。

use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use super::{budget, ledger, rent};
use crate::application::error::ApplicationError;
use crate::application::ports::{ChapterRecord, LedgerEntryRecord, ModuleRecord, UnitOfWork};
use crate::domain::catalog::{ChapterMode, ModuleMode};
use crate::domain::unlock::{ChapterSlot, ModuleSlot, UnlockStep, UnlockWalker};

/// 被解锁内容的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Module,
    Chapter,
}

/// 一次解锁事件
#[derive(Debug, Clone, Serialize)]
pub struct UnlockedContent {
    pub kind: ContentKind,
    pub id: Uuid,
    /// 模块事件为自身 ID，章节事件为所属模块 ID
    pub module_id: Uuid,
    pub title: String,
    pub order: i64,
    pub price: i64,
    pub budget_after: i64,
}

/// 从租借模式自动切换为已发布的模块
#[derive(Debug, Clone, Serialize)]
pub struct SwitchedModule {
    pub id: Uuid,
    pub title: String,
}

/// 解锁结果
#[derive(Debug, Clone, Serialize)]
pub struct UnlockOutcome {
    pub novel_id: Uuid,
    pub unlocked_content: Vec<UnlockedContent>,
    pub final_budget: i64,
    pub switched_modules: Vec<SwitchedModule>,
}

impl UnlockOutcome {
    fn untouched(novel_id: Uuid, budget: i64) -> Self {
        Self {
            novel_id,
            unlocked_content: Vec::new(),
            final_budget: budget,
            switched_modules: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.unlocked_content.is_empty() && self.switched_modules.is_empty()
    }

    /// 本轮消耗的预算
    pub fn spent(&self) -> i64 {
        self.unlocked_content.iter().map(|c| c.price).sum()
    }
}

/// 顺序解锁引擎
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlockEngine;

impl UnlockEngine {
    pub fn new() -> Self {
        Self
    }

    pub async fn unlock(
        &self,
        uow: &mut dyn UnitOfWork,
        novel_id: Uuid,
    ) -> Result<UnlockOutcome, ApplicationError> {
        let novel = uow
            .find_novel(novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", novel_id))?;

        if novel.budget <= 0 {
            tracing::debug!(novel_id = %novel_id, budget = novel.budget, "No budget, unlock skipped");
            return Ok(UnlockOutcome::untouched(novel_id, novel.budget));
        }

        let modules = uow.list_modules(novel_id).await?;
        let chapters = uow.list_novel_chapters(novel_id).await?;
        let slots = build_slots(modules, chapters);

        let mut walker = UnlockWalker::new(&slots, novel.budget);
        let mut unlocked: Vec<UnlockedContent> = Vec::new();
        let mut touched_rent: Vec<Uuid> = Vec::new();

        for step in walker.by_ref() {
            match step {
                UnlockStep::Module {
                    module_id,
                    title,
                    order,
                    price,
                    budget_after,
                } => {
                    uow.set_module_mode(module_id, ModuleMode::Published).await?;
                    if !price.is_free() {
                        let entry = LedgerEntryRecord::system_unlock(
                            novel_id,
                            price.value(),
                            format!("Unlocked module: {}", title),
                            budget_after,
                        );
                        ledger::append(uow, &entry).await?;
                    }
                    tracing::debug!(novel_id = %novel_id, module_id = %module_id, price = price.value(), budget_after, "Module unlocked");
                    unlocked.push(UnlockedContent {
                        kind: ContentKind::Module,
                        id: module_id,
                        module_id,
                        title,
                        order,
                        price: price.value(),
                        budget_after,
                    });
                }
                UnlockStep::Chapter {
                    module_id,
                    module_mode,
                    chapter_id,
                    title,
                    order,
                    price,
                    budget_after,
                } => {
                    uow.set_chapter_mode(chapter_id, ChapterMode::Published).await?;
                    if !price.is_free() {
                        let entry = LedgerEntryRecord::system_unlock(
                            novel_id,
                            price.value(),
                            format!("Unlocked chapter: {}", title),
                            budget_after,
                        );
                        ledger::append(uow, &entry).await?;
                    }
                    if module_mode == ModuleMode::Rent && !touched_rent.contains(&module_id) {
                        touched_rent.push(module_id);
                    }
                    tracing::debug!(novel_id = %novel_id, chapter_id = %chapter_id, price = price.value(), budget_after, "Chapter unlocked");
                    unlocked.push(UnlockedContent {
                        kind: ContentKind::Chapter,
                        id: chapter_id,
                        module_id,
                        title,
                        order,
                        price: price.value(),
                        budget_after,
                    });
                }
            }
        }

        let final_budget = walker.remaining_budget();
        let final_state = walker.state();

        let mut switched_modules = Vec::new();
        for module_id in touched_rent {
            rent::recalculate(uow, module_id).await?;
            let result = rent::check_auto_switch(uow, module_id).await?;
            if result.switched {
                switched_modules.push(SwitchedModule {
                    id: result.module.id,
                    title: result.module.title,
                });
            }
        }

        budget::set_budget(uow, novel_id, final_budget).await?;
        if !unlocked.is_empty() {
            uow.touch_novel(novel_id, Utc::now()).await?;
        }

        tracing::info!(
            novel_id = %novel_id,
            initial_budget = novel.budget,
            final_budget,
            unlocked = unlocked.len(),
            switched = switched_modules.len(),
            state = ?final_state,
            "Unlock pass finished"
        );

        Ok(UnlockOutcome {
            novel_id,
            unlocked_content: unlocked,
            final_budget,
            switched_modules,
        })
    }
}

/// 把章节挂到所属模块下，保持两级 order 升序
fn build_slots(modules: Vec<ModuleRecord>, chapters: Vec<ChapterRecord>) -> Vec<ModuleSlot> {
    let mut by_module: HashMap<Uuid, Vec<ChapterSlot>> = HashMap::new();
    for chapter in chapters {
        by_module
            .entry(chapter.module_id)
            .or_default()
            .push(ChapterSlot {
                id: chapter.id,
                title: chapter.title,
                order: chapter.order,
                mode: chapter.mode,
                price: chapter.price,
            });
    }

    modules
        .into_iter()
        .map(|module| {
            let mut chapters = by_module.remove(&module.id).unwrap_or_default();
            chapters.sort_by_key(|c| c.order);
            ModuleSlot {
                id: module.id,
                title: module.title,
                order: module.order,
                mode: module.mode,
                price: module.price,
                chapters,
            }
        })
        .collect()
}
