//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（UnitOfWork、Repository、CatalogCache）
//! - engine: 预算、账本、租借重算与顺序解锁
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod engine;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Catalog commands
    CreateChapter,
    CreateModule,
    CreateNovel,
    // Funding commands
    Contribute,
    SendGift,
    // Admin commands
    AdjustBudget,
    ManualUnlock,
    WithdrawBalance,
    // Handlers
    handlers::{
        AdjustBudgetHandler, AdjustBudgetResponse, ContributeHandler, ContributeResponse,
        CreateChapterHandler, CreateModuleHandler, CreateNovelHandler, GiftResponse,
        ManualUnlockHandler, SendGiftHandler, WithdrawBalanceHandler, WithdrawResponse,
    },
};

pub use engine::{
    RetryPolicy, SwitchedModule, TransactionRunner, UnlockEngine, UnlockOutcome, UnlockedContent,
};

pub use error::ApplicationError;

pub use ports::{
    // Unit of work
    UnitOfWork,
    UnitOfWorkFactory,
    // Repositories
    BudgetTotals,
    ChapterRecord,
    FundsMovementRecord,
    LedgerEntryRecord,
    ModuleRecord,
    NovelRecord,
    NovelRepositoryPort,
    RepositoryError,
    // Catalog cache
    CatalogCachePort,
    CatalogSnapshot,
    ModuleWithChapters,
};

pub use queries::{
    // Catalog queries
    GetNovelCatalog,
    // Ledger queries
    GetFundsLog,
    GetLedgerHistory,
    // Handlers
    handlers::{GetFundsLogHandler, GetLedgerHistoryHandler, GetNovelCatalogHandler},
};
