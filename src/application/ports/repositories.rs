//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口与持久化实体
//! 具体实现在 infrastructure 层（如 SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::catalog_cache::CatalogSnapshot;
use crate::domain::catalog::{ChapterMode, ModuleMode, Price};
use crate::domain::funding::{FundsDirection, LedgerKind};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    /// 写锁冲突，整个事务可以重试
    #[error("Store busy: {0}")]
    Busy(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Records
// ============================================================================

/// 小说实体（用于持久化）
#[derive(Debug, Clone)]
pub struct NovelRecord {
    pub id: Uuid,
    pub title: String,
    /// 可用于解锁的预算
    pub budget: i64,
    /// 累计余额（与预算独立）
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 模块实体
#[derive(Debug, Clone)]
pub struct ModuleRecord {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub title: String,
    pub order: i64,
    pub mode: ModuleMode,
    pub price: Price,
    /// 租借模式下尚未解锁的付费章节总价
    pub rent_remaining_balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 章节实体
#[derive(Debug, Clone)]
pub struct ChapterRecord {
    pub id: Uuid,
    pub module_id: Uuid,
    pub novel_id: Uuid,
    pub title: String,
    pub order: i64,
    pub mode: ChapterMode,
    pub price: Price,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 账本条目（只追加）
#[derive(Debug, Clone)]
pub struct LedgerEntryRecord {
    pub id: Uuid,
    pub novel_id: Uuid,
    /// 为空表示系统自动解锁扣减
    pub user_id: Option<Uuid>,
    /// 带符号金额
    pub amount: i64,
    pub note: String,
    pub budget_after: i64,
    pub kind: LedgerKind,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntryRecord {
    pub fn new(
        novel_id: Uuid,
        user_id: Option<Uuid>,
        amount: i64,
        note: impl Into<String>,
        budget_after: i64,
        kind: LedgerKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            novel_id,
            user_id,
            amount,
            note: note.into(),
            budget_after,
            kind,
            created_at: Utc::now(),
        }
    }

    /// 系统自动解锁扣减条目
    pub fn system_unlock(
        novel_id: Uuid,
        price: i64,
        note: impl Into<String>,
        budget_after: i64,
    ) -> Self {
        Self::new(novel_id, None, -price, note, budget_after, LedgerKind::System)
    }
}

/// 资金流水（存入 / 提取）
#[derive(Debug, Clone)]
pub struct FundsMovementRecord {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub user_id: Option<Uuid>,
    pub amount: i64,
    pub direction: FundsDirection,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl FundsMovementRecord {
    pub fn new(
        novel_id: Uuid,
        user_id: Option<Uuid>,
        amount: i64,
        direction: FundsDirection,
        note: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            novel_id,
            user_id,
            amount,
            direction,
            note: note.into(),
            created_at: Utc::now(),
        }
    }
}

/// 预算与余额的当前值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetTotals {
    pub budget: i64,
    pub balance: i64,
}

// ============================================================================
// Novel Repository (read side)
// ============================================================================

/// Novel Repository Port - 只读查询
///
/// 不提供任何修改方法：预算、余额与模式只能在 UnitOfWork 中修改
#[async_trait]
pub trait NovelRepositoryPort: Send + Sync {
    /// 根据 ID 查找小说
    async fn find_by_id(&self, id: Uuid) -> Result<Option<NovelRecord>, RepositoryError>;

    /// 在同一个读事务中加载小说、模块与章节
    ///
    /// 三次读取看到的是同一个数据库快照，小说不存在时返回 None
    async fn load_catalog(&self, novel_id: Uuid)
        -> Result<Option<CatalogSnapshot>, RepositoryError>;

    /// 账本历史（最新在前）
    async fn ledger_history(
        &self,
        novel_id: Uuid,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LedgerEntryRecord>, RepositoryError>;

    /// 资金流水（最新在前）
    async fn funds_movements(
        &self,
        novel_id: Uuid,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<FundsMovementRecord>, RepositoryError>;
}
