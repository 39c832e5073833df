//! Funding Command Handlers - 贡献与礼物
//!
//! 事务提交之后才失效缓存、推送事件

use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::{Contribute, SendGift};
use crate::application::engine::{budget, ledger, TransactionRunner, UnlockEngine, UnlockOutcome};
use crate::application::error::ApplicationError;
use crate::application::ports::{CatalogCachePort, FundsMovementRecord, LedgerEntryRecord};
use crate::domain::funding::{FundsDirection, LedgerKind};
use crate::infrastructure::events::EventPublisher;

// ============================================================================
// Contribute
// ============================================================================

/// 贡献响应
#[derive(Debug, Clone)]
pub struct ContributeResponse {
    pub novel_id: Uuid,
    pub amount: i64,
    /// 解锁后的预算
    pub budget: i64,
    pub balance: i64,
    pub unlock: UnlockOutcome,
}

/// Contribute Handler
///
/// 入账、账本、流水与解锁遍历在同一个事务中完成
pub struct ContributeHandler {
    runner: Arc<TransactionRunner>,
    cache: Arc<dyn CatalogCachePort>,
    publisher: Arc<EventPublisher>,
}

impl ContributeHandler {
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

    pub async fn handle(&self, command: Contribute) -> Result<ContributeResponse, ApplicationError> {
        let Contribute {
            novel_id,
            user_id,
            amount,
            note,
        } = command;
        let note = note.unwrap_or_else(|| "Contribution".to_string());

        let response = self
            .runner
            .run("contribute", move |uow| {
                let note = note.clone();
                Box::pin(async move {
                    let totals = budget::credit(uow, novel_id, amount).await?;
                    let entry = LedgerEntryRecord::new(
                        novel_id,
                        Some(user_id),
                        amount,
                        note.clone(),
                        totals.budget,
                        LedgerKind::User,
                    );
                    ledger::append(uow, &entry).await?;
                    let movement = FundsMovementRecord::new(
                        novel_id,
                        Some(user_id),
                        amount,
                        FundsDirection::Deposit,
                        note,
                    );
                    ledger::record_movement(uow, &movement).await?;

                    let unlock = UnlockEngine::new().unlock(uow, novel_id).await?;
                    Ok::<_, ApplicationError>(ContributeResponse {
                        novel_id,
                        amount,
                        budget: unlock.final_budget,
                        balance: totals.balance,
                        unlock,
                    })
                })
            })
            .await?;

        self.cache.invalidate(novel_id);
        self.publisher.publish_contribution(
            novel_id,
            user_id,
            amount,
            response.budget,
            response.balance,
        );
        self.publisher.publish_unlock_outcome(&response.unlock);

        tracing::info!(
            novel_id = %novel_id,
            user_id = %user_id,
            amount,
            budget = response.budget,
            balance = response.balance,
            unlocked = response.unlock.unlocked_content.len(),
            "Contribution received"
        );
        Ok(response)
    }
}

// ============================================================================
// SendGift
// ============================================================================

/// 礼物响应
#[derive(Debug, Clone)]
pub struct GiftResponse {
    pub novel_id: Uuid,
    pub amount: i64,
    pub budget: i64,
    pub balance: i64,
}

/// SendGift Handler - 礼物只增加余额，不触发解锁
pub struct SendGiftHandler {
    runner: Arc<TransactionRunner>,
    cache: Arc<dyn CatalogCachePort>,
    publisher: Arc<EventPublisher>,
}

impl SendGiftHandler {
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

    pub async fn handle(&self, command: SendGift) -> Result<GiftResponse, ApplicationError> {
        let SendGift {
            novel_id,
            user_id,
            amount,
            note,
        } = command;
        let note = note.unwrap_or_else(|| "Gift".to_string());

        let response = self
            .runner
            .run("send_gift", move |uow| {
                let note = note.clone();
                Box::pin(async move {
                    let totals = budget::credit_balance(uow, novel_id, amount).await?;
                    let entry = LedgerEntryRecord::new(
                        novel_id,
                        Some(user_id),
                        amount,
                        note.clone(),
                        totals.budget,
                        LedgerKind::Gift,
                    );
                    ledger::append(uow, &entry).await?;
                    let movement = FundsMovementRecord::new(
                        novel_id,
                        Some(user_id),
                        amount,
                        FundsDirection::Deposit,
                        note,
                    );
                    ledger::record_movement(uow, &movement).await?;
                    Ok::<_, ApplicationError>(GiftResponse {
                        novel_id,
                        amount,
                        budget: totals.budget,
                        balance: totals.balance,
                    })
                })
            })
            .await?;

        self.cache.invalidate(novel_id);
        self.publisher
            .publish_gift(novel_id, user_id, amount, response.balance);

        tracing::info!(
            novel_id = %novel_id,
            user_id = %user_id,
            amount,
            balance = response.balance,
            "Gift received"
        );
        Ok(response)
    }
}
