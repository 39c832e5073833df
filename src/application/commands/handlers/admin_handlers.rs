//! Admin Command Handlers - 手动解锁、预算修正、余额提取

use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::{AdjustBudget, ManualUnlock, WithdrawBalance};
use crate::application::engine::{budget, ledger, TransactionRunner, UnlockEngine, UnlockOutcome};
use crate::application::error::ApplicationError;
use crate::application::ports::{CatalogCachePort, FundsMovementRecord, LedgerEntryRecord};
use crate::domain::funding::{FundsDirection, LedgerKind};
use crate::infrastructure::events::EventPublisher;

// ============================================================================
// ManualUnlock
// ============================================================================

/// ManualUnlock Handler - 不入账，直接用当前预算跑一轮解锁
pub struct ManualUnlockHandler {
    runner: Arc<TransactionRunner>,
    cache: Arc<dyn CatalogCachePort>,
    publisher: Arc<EventPublisher>,
}

impl ManualUnlockHandler {
    pub fn new(
        runner: Arc<TransactionRunner>,
        cache: Arc<dyn CatalogCachePort>,
        publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            runner,
            cache,
            publisher,
        }
    }

    pub async fn handle(&self, command: ManualUnlock) -> Result<UnlockOutcome, ApplicationError> {
        let novel_id = command.novel_id;

        let outcome = self
            .runner
            .run("manual_unlock", move |uow| {
                Box::pin(async move { UnlockEngine::new().unlock(uow, novel_id).await })
            })
            .await?;

        if !outcome.is_empty() {
            self.cache.invalidate(novel_id);
            self.publisher.publish_unlock_outcome(&outcome);
        }

        tracing::info!(
            novel_id = %novel_id,
            unlocked = outcome.unlocked_content.len(),
            final_budget = outcome.final_budget,
            "Manual unlock finished"
        );
        Ok(outcome)
    }
}

// ============================================================================
// AdjustBudget
// ============================================================================

/// 预算修正响应
#[derive(Debug, Clone)]
pub struct AdjustBudgetResponse {
    pub novel_id: Uuid,
    pub budget: i64,
    pub delta: i64,
}

/// AdjustBudget Handler
///
/// 只替换预算并记录管理员账本条目，不触发解锁
pub struct AdjustBudgetHandler {
    runner: Arc<TransactionRunner>,
    cache: Arc<dyn CatalogCachePort>,
}

impl AdjustBudgetHandler {
    pub fn new(runner: Arc<TransactionRunner>, cache: Arc<dyn CatalogCachePort>) -> Self {
        Self { runner, cache }
    }

    pub async fn handle(
        &self,
        command: AdjustBudget,
    ) -> Result<AdjustBudgetResponse, ApplicationError> {
        let AdjustBudget {
            novel_id,
            admin_id,
            new_budget,
            note,
        } = command;
        let note = note.unwrap_or_else(|| "Budget adjustment".to_string());

        let delta = self
            .runner
            .run("adjust_budget", move |uow| {
                let note = note.clone();
                Box::pin(async move {
                    let delta = budget::set_budget(uow, novel_id, new_budget).await?;
                    if delta != 0 {
                        let entry = LedgerEntryRecord::new(
                            novel_id,
                            Some(admin_id),
                            delta,
                            note,
                            new_budget,
                            LedgerKind::Admin,
                        );
                        ledger::append(uow, &entry).await?;
                    }
                    Ok::<_, ApplicationError>(delta)
                })
            })
            .await?;

        if delta != 0 {
            self.cache.invalidate(novel_id);
        }
        tracing::info!(
            novel_id = %novel_id,
            admin_id = %admin_id,
            budget = new_budget,
            delta,
            "Budget adjusted"
        );
        Ok(AdjustBudgetResponse {
            novel_id,
            budget: new_budget,
            delta,
        })
    }
}

// ============================================================================
// WithdrawBalance
// ============================================================================

/// 提取响应
#[derive(Debug, Clone)]
pub struct WithdrawResponse {
    pub novel_id: Uuid,
    pub amount: i64,
    pub balance: i64,
}

/// WithdrawBalance Handler
pub struct WithdrawBalanceHandler {
    runner: Arc<TransactionRunner>,
    cache: Arc<dyn CatalogCachePort>,
}

impl WithdrawBalanceHandler {
    pub fn new(runner: Arc<TransactionRunner>, cache: Arc<dyn CatalogCachePort>) -> Self {
        Self { runner, cache }
    }

    pub async fn handle(
        &self,
        command: WithdrawBalance,
    ) -> Result<WithdrawResponse, ApplicationError> {
        let WithdrawBalance {
            novel_id,
            admin_id,
            amount,
            note,
        } = command;
        let note = note.unwrap_or_else(|| "Withdrawal".to_string());

        let totals = self
            .runner
            .run("withdraw_balance", move |uow| {
                let note = note.clone();
                Box::pin(async move {
                    let totals = budget::withdraw_balance(uow, novel_id, amount).await?;
                    let movement = FundsMovementRecord::new(
                        novel_id,
                        Some(admin_id),
                        amount,
                        FundsDirection::Withdrawal,
                        note,
                    );
                    ledger::record_movement(uow, &movement).await?;
                    Ok::<_, ApplicationError>(totals)
                })
            })
            .await?;

        self.cache.invalidate(novel_id);
        tracing::info!(
            novel_id = %novel_id,
            admin_id = %admin_id,
            amount,
            balance = totals.balance,
            "Balance withdrawn"
        );
        Ok(WithdrawResponse {
            novel_id,
            amount,
            balance: totals.balance,
        })
    }
}
