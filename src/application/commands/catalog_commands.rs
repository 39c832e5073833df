//! Catalog Commands - 目录写操作

use uuid::Uuid;

use crate::domain::catalog::{ChapterMode, ModuleMode};

/// 创建小说命令
#[derive(Debug, Clone)]
pub struct CreateNovel {
    pub title: String,
}

/// 创建模块命令
#[derive(Debug, Clone)]
pub struct CreateModule {
    pub novel_id: Uuid,
    pub title: String,
    pub order: i64,
    pub mode: ModuleMode,
    pub price: i64,
}

/// 创建章节命令
#[derive(Debug, Clone)]
pub struct CreateChapter {
    pub module_id: Uuid,
    pub title: String,
    pub order: i64,
    pub mode: ChapterMode,
    pub price: i64,
}
