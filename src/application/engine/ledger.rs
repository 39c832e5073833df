//! Ledger Store - 只追加的账本写入
//!
//! 只暴露追加操作；读路径见 queries::GetLedgerHistory。

use crate::application::error::ApplicationError;
use crate::application::ports::{FundsMovementRecord, LedgerEntryRecord, UnitOfWork};
use crate::domain::funding::LedgerKind;

/// 追加账本条目
pub async fn append(
    uow: &mut dyn UnitOfWork,
    entry: &LedgerEntryRecord,
) -> Result<(), ApplicationError> {
    // 系统条目与空 user_id 一一对应
    if (entry.kind == LedgerKind::System) != entry.user_id.is_none() {
        return Err(ApplicationError::internal(format!(
            "ledger entry kind {} inconsistent with user_id {:?}",
            entry.kind.as_str(),
            entry.user_id
        )));
    }

    uow.append_ledger_entry(entry).await?;

    tracing::debug!(
        novel_id = %entry.novel_id,
        kind = entry.kind.as_str(),
        amount = entry.amount,
        budget_after = entry.budget_after,
        "Ledger entry appended"
    );
    Ok(())
}

/// 追加资金流水
pub async fn record_movement(
    uow: &mut dyn UnitOfWork,
    movement: &FundsMovementRecord,
) -> Result<(), ApplicationError> {
    uow.append_funds_movement(movement).await?;
    Ok(())
}
