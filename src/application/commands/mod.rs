//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：处理所有写操作

mod admin_commands;
mod catalog_commands;
mod funding_commands;

pub mod handlers;

pub use admin_commands::*;
pub use catalog_commands::*;
pub use funding_commands::*;
