//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;
use std::time::Duration;

use crate::application::{
    // Command handlers
    AdjustBudgetHandler, ContributeHandler, CreateChapterHandler, CreateModuleHandler,
    CreateNovelHandler, ManualUnlockHandler, SendGiftHandler, WithdrawBalanceHandler,
    // Query handlers
    GetFundsLogHandler, GetLedgerHistoryHandler, GetNovelCatalogHandler,
    // Ports
    CatalogCachePort, NovelRepositoryPort, RetryPolicy, TransactionRunner, UnitOfWorkFactory,
};
use crate::infrastructure::events::EventPublisher;

/// 应用状态
pub struct AppState {
    // ========== Shared ==========
    pub event_publisher: Arc<EventPublisher>,
    /// SSE 心跳间隔
    pub keep_alive: Duration,

    // ========== Command Handlers ==========
    pub create_novel_handler: CreateNovelHandler,
    pub create_module_handler: CreateModuleHandler,
    pub create_chapter_handler: CreateChapterHandler,
    pub contribute_handler: ContributeHandler,
    pub send_gift_handler: SendGiftHandler,
    pub manual_unlock_handler: ManualUnlockHandler,
    pub adjust_budget_handler: AdjustBudgetHandler,
    pub withdraw_balance_handler: WithdrawBalanceHandler,

    // ========== Query Handlers ==========
    pub get_catalog_handler: GetNovelCatalogHandler,
    pub ledger_history_handler: GetLedgerHistoryHandler,
    pub funds_log_handler: GetFundsLogHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        catalog_cache: Arc<dyn CatalogCachePort>,
        event_publisher: Arc<EventPublisher>,
        retry_policy: RetryPolicy,
        keep_alive: Duration,
    ) -> Self {
        let runner = Arc::new(TransactionRunner::new(uow_factory, retry_policy));

        Self {
            event_publisher: event_publisher.clone(),
            keep_alive,

            // Command handlers
            create_novel_handler: CreateNovelHandler::new(runner.clone()),
            create_module_handler: CreateModuleHandler::new(runner.clone(), catalog_cache.clone()),
            create_chapter_handler: CreateChapterHandler::new(
                runner.clone(),
                catalog_cache.clone(),
            ),
            contribute_handler: ContributeHandler::new(
                runner.clone(),
                catalog_cache.clone(),
                event_publisher.clone(),
            ),
            send_gift_handler: SendGiftHandler::new(
                runner.clone(),
                catalog_cache.clone(),
                event_publisher.clone(),
            ),
            manual_unlock_handler: ManualUnlockHandler::new(
                runner.clone(),
                catalog_cache.clone(),
                event_publisher.clone(),
            ),
            adjust_budget_handler: AdjustBudgetHandler::new(runner.clone(), catalog_cache.clone()),
            withdraw_balance_handler: WithdrawBalanceHandler::new(runner, catalog_cache.clone()),

            // Query handlers
            get_catalog_handler: GetNovelCatalogHandler::new(novel_repo.clone(), catalog_cache),
            ledger_history_handler: GetLedgerHistoryHandler::new(novel_repo.clone()),
            funds_log_handler: GetFundsLogHandler::new(novel_repo),
        }
    }
}
