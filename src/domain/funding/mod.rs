//! Funding Context - 资金限界上下文
//!
//! 职责:
//! - 入账金额校验
//! - 账本条目与资金流水的分类

mod errors;
mod value_objects;

pub use errors::FundingError;
pub use value_objects::{Amount, FundsDirection, LedgerKind};
