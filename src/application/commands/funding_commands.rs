//! Funding Commands - 读者侧资金操作

use uuid::Uuid;

/// 贡献命令：增加预算与余额并触发解锁
#[derive(Debug, Clone)]
pub struct Contribute {
    pub novel_id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub note: Option<String>,
}

/// 礼物命令：只增加余额
#[derive(Debug, Clone)]
pub struct SendGift {
    pub novel_id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub note: Option<String>,
}
