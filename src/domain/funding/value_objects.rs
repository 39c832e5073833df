//! Funding Context - Value Objects

use serde::{Deserialize, Serialize};

use super::FundingError;

/// 入账金额（严格为正）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(i64);

impl Amount {
    pub fn new(value: i64) -> Result<Self, FundingError> {
        if value <= 0 {
            return Err(FundingError::InvalidAmount(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 账本条目来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    /// 用户贡献
    User,
    /// 系统自动解锁扣减（user_id 为空）
    System,
    /// 管理员调整
    Admin,
    /// 礼物
    Gift,
}

impl LedgerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerKind::User => "user",
            LedgerKind::System => "system",
            LedgerKind::Admin => "admin",
            LedgerKind::Gift => "gift",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(LedgerKind::User),
            "system" => Some(LedgerKind::System),
            "admin" => Some(LedgerKind::Admin),
            "gift" => Some(LedgerKind::Gift),
            _ => None,
        }
    }
}

/// 资金流水方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundsDirection {
    Deposit,
    Withdrawal,
}

impl FundsDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            FundsDirection::Deposit => "deposit",
            FundsDirection::Withdrawal => "withdrawal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "deposit" => Some(FundsDirection::Deposit),
            "withdrawal" => Some(FundsDirection::Withdrawal),
            _ => None,
        }
    }
}
