//! Rent-Mode Balance Recalculator

use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{ModuleRecord, UnitOfWork};
use crate::domain::catalog::ModuleMode;
use crate::domain::unlock::{outstanding_rent_balance, should_auto_switch};

/// 自动切换检查结果
#[derive(Debug, Clone)]
pub struct AutoSwitchResult {
    pub switched: bool,
    pub module: ModuleRecord,
}

async fn load_module(
    uow: &mut dyn UnitOfWork,
    module_id: Uuid,
) -> Result<ModuleRecord, ApplicationError> {
    uow.find_module(module_id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("Module", module_id))
}

async fn outstanding(uow: &mut dyn UnitOfWork, module_id: Uuid) -> Result<i64, ApplicationError> {
    let chapters = uow.list_module_chapters(module_id).await?;
    Ok(outstanding_rent_balance(
        chapters.iter().map(|c| (c.mode, c.price)),
    ))
}

/// 重新计算租借模块的 `rent_remaining_balance`
///
/// 非租借模块不做任何写入；值未变化时同样不写。
pub async fn recalculate(
    uow: &mut dyn UnitOfWork,
    module_id: Uuid,
) -> Result<i64, ApplicationError> {
    let module = load_module(uow, module_id).await?;
    if module.mode != ModuleMode::Rent {
        return Ok(module.rent_remaining_balance);
    }

    let balance = outstanding(uow, module_id).await?;
    if balance != module.rent_remaining_balance {
        uow.set_rent_remaining_balance(module_id, balance).await?;
        tracing::debug!(
            module_id = %module_id,
            before = module.rent_remaining_balance,
            after = balance,
            "Rent balance recalculated"
        );
    }
    Ok(balance)
}

/// 租借模块的未解锁余额耗尽后切换为已发布
pub async fn check_auto_switch(
    uow: &mut dyn UnitOfWork,
    module_id: Uuid,
) -> Result<AutoSwitchResult, ApplicationError> {
    let mut module = load_module(uow, module_id).await?;
    if module.mode != ModuleMode::Rent {
        return Ok(AutoSwitchResult {
            switched: false,
            module,
        });
    }

    let balance = outstanding(uow, module_id).await?;
    if !should_auto_switch(balance) {
        return Ok(AutoSwitchResult {
            switched: false,
            module,
        });
    }

    uow.set_module_mode(module_id, ModuleMode::Published).await?;
    module.mode = ModuleMode::Published;
    module.rent_remaining_balance = balance;

    tracing::info!(
        module_id = %module_id,
        novel_id = %module.novel_id,
        "Rent module switched to published"
    );

    Ok(AutoSwitchResult {
        switched: true,
        module,
    })
}
