//! Catalog Queries

use uuid::Uuid;

/// 获取小说目录（预算、余额、模块及章节）
#[derive(Debug, Clone)]
pub struct GetNovelCatalog {
    pub novel_id: Uuid,
}
