//! Budget Accessor - 预算与余额的唯一写入者
//!
//! 所有修改都是存储层的原子增量，并且只能在调用方提供的事务中执行。

use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{BudgetTotals, UnitOfWork};
use crate::domain::funding::Amount;

/// 贡献入账：预算与余额同时增加 `amount`
pub async fn credit(
    uow: &mut dyn UnitOfWork,
    novel_id: Uuid,
    amount: i64,
) -> Result<BudgetTotals, ApplicationError> {
    let amount = Amount::new(amount)?;
    increment(uow, novel_id, amount.value(), amount).await
}

/// 礼物入账：只增加余额，不影响预算
pub async fn credit_balance(
    uow: &mut dyn UnitOfWork,
    novel_id: Uuid,
    amount: i64,
) -> Result<BudgetTotals, ApplicationError> {
    let amount = Amount::new(amount)?;
    increment(uow, novel_id, 0, amount).await
}

/// 存储层拒绝增量时区分小说不存在与数值溢出
async fn increment(
    uow: &mut dyn UnitOfWork,
    novel_id: Uuid,
    budget_delta: i64,
    amount: Amount,
) -> Result<BudgetTotals, ApplicationError> {
    if let Some(totals) = uow
        .increment_funds(novel_id, budget_delta, amount.value())
        .await?
    {
        return Ok(totals);
    }

    match uow.find_novel(novel_id).await? {
        Some(novel) => {
            tracing::warn!(
                novel_id = %novel_id,
                amount = amount.value(),
                budget = novel.budget,
                balance = novel.balance,
                "Credit would overflow novel totals"
            );
            Err(ApplicationError::InvalidAmount(amount.value()))
        }
        None => Err(ApplicationError::not_found("Novel", novel_id)),
    }
}

/// 提取余额，余额不足时拒绝
pub async fn withdraw_balance(
    uow: &mut dyn UnitOfWork,
    novel_id: Uuid,
    amount: i64,
) -> Result<BudgetTotals, ApplicationError> {
    let amount = Amount::new(amount)?;
    if let Some(totals) = uow.decrement_balance(novel_id, amount.value()).await? {
        return Ok(totals);
    }

    let novel = uow
        .find_novel(novel_id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("Novel", novel_id))?;
    Err(ApplicationError::InsufficientBalance {
        available: novel.balance,
        requested: amount.value(),
    })
}

/// 替换预算，返回变化量（新值 - 旧值）
pub async fn set_budget(
    uow: &mut dyn UnitOfWork,
    novel_id: Uuid,
    new_budget: i64,
) -> Result<i64, ApplicationError> {
    if new_budget < 0 {
        return Err(ApplicationError::InvalidAmount(new_budget));
    }
    let previous = uow
        .replace_budget(novel_id, new_budget)
        .await?
        .ok_or_else(|| ApplicationError::not_found("Novel", novel_id))?;
    Ok(new_budget - previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::UnitOfWorkFactory;
    use crate::infrastructure::persistence::sqlite::testing::TestDb;

    #[tokio::test]
    async fn test_credit_overflow_is_invalid_amount() {
        let db = TestDb::new().await;
        let novel_id = db.seed_novel(1).await;

        let mut uow = db.factory().begin().await.unwrap();
        let err = credit(&mut *uow, novel_id, i64::MAX).await.unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidAmount(i64::MAX)));
        let err = credit_balance(&mut *uow, novel_id, i64::MAX)
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidAmount(i64::MAX)));

        let totals = credit(&mut *uow, novel_id, i64::MAX - 1).await.unwrap();
        assert_eq!(totals, BudgetTotals { budget: i64::MAX, balance: i64::MAX });
        uow.rollback().await.unwrap();

        assert_eq!(db.totals(novel_id).await, (1, 1));
    }

    #[tokio::test]
    async fn test_credit_unknown_novel_is_not_found() {
        let db = TestDb::new().await;
        let mut uow = db.factory().begin().await.unwrap();
        let err = credit(&mut *uow, Uuid::new_v4(), 10).await.unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
        uow.rollback().await.unwrap();
    }
}
