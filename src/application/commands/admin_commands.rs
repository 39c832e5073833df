//! Admin Commands - 管理侧操作

use uuid::Uuid;

/// 手动触发一轮解锁
#[derive(Debug, Clone)]
pub struct ManualUnlock {
    pub novel_id: Uuid,
}

/// 修正预算
#[derive(Debug, Clone)]
pub struct AdjustBudget {
    pub novel_id: Uuid,
    pub admin_id: Uuid,
    pub new_budget: i64,
    pub note: Option<String>,
}

/// 提取余额
#[derive(Debug, Clone)]
pub struct WithdrawBalance {
    pub novel_id: Uuid,
    pub admin_id: Uuid,
    pub amount: i64,
    pub note: Option<String>,
}
