//! Catalog Cache Port - 目录读缓存
//!
//! 只缓存读路径；写操作提交后由命令处理器负责失效

use std::sync::Arc;
use uuid::Uuid;

use super::repositories::{ChapterRecord, ModuleRecord, NovelRecord};

/// 模块及其章节
#[derive(Debug, Clone)]
pub struct ModuleWithChapters {
    pub module: ModuleRecord,
    pub chapters: Vec<ChapterRecord>,
}

/// 小说目录快照
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub novel: NovelRecord,
    pub modules: Vec<ModuleWithChapters>,
}

impl CatalogSnapshot {
    /// 将按 (模块 order, 章节 order) 排好序的章节挂到对应模块下
    pub fn assemble(
        novel: NovelRecord,
        modules: Vec<ModuleRecord>,
        chapters: Vec<ChapterRecord>,
    ) -> Self {
        let mut modules: Vec<ModuleWithChapters> = modules
            .into_iter()
            .map(|module| ModuleWithChapters {
                module,
                chapters: Vec::new(),
            })
            .collect();

        for chapter in chapters {
            if let Some(slot) = modules.iter_mut().find(|m| m.module.id == chapter.module_id) {
                slot.chapters.push(chapter);
            }
        }

        Self { novel, modules }
    }
}

/// Catalog Cache Port
///
/// 每个小说维护一个世代号，`invalidate` 使其递增。
/// 读者在读库之前取世代号，`put` 时世代号已变化则不保存快照。
pub trait CatalogCachePort: Send + Sync {
    fn get(&self, novel_id: Uuid) -> Option<Arc<CatalogSnapshot>>;

    /// 当前世代号
    fn generation(&self, novel_id: Uuid) -> u64;

    /// 世代号仍为 `generation` 时保存快照；总是返回包装后的快照
    fn put(&self, snapshot: CatalogSnapshot, generation: u64) -> Arc<CatalogSnapshot>;

    fn invalidate(&self, novel_id: Uuid);
}
