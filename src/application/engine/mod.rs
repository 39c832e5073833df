//! 解锁引擎
//!
//! - budget: 预算与余额的原子修改
//! - ledger: 只追加的账本写入
//! - rent: 租借模式余额重算与自动切换
//! - unlock: 顺序解锁遍历
//! - transaction: 事务边界与冲突重试
//!
//! 除 transaction 外，所有操作都接收 `&mut dyn UnitOfWork`，
//! 因此无法在事务之外修改预算、余额或内容模式。

pub mod budget;
pub mod ledger;
pub mod rent;
mod transaction;
mod unlock;

pub use rent::AutoSwitchResult;
pub use transaction::{RetryPolicy, TransactionRunner};
pub use unlock::{ContentKind, SwitchedModule, UnlockEngine, UnlockOutcome, UnlockedContent};
