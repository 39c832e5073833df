//! Unlock Context - 顺序自动解锁
//!
//! 纯领域逻辑，不涉及 I/O：
//! - 在目录快照上按顺序消耗预算的状态机
//! - 租借模式的余额计算规则

mod rent;
mod walker;

pub use rent::{outstanding_rent_balance, should_auto_switch};
pub use walker::{ChapterSlot, ModuleSlot, UnlockStep, UnlockWalker, WalkState};
