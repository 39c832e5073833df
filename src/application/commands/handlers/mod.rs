//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod admin_handlers;
mod catalog_handlers;
mod funding_handlers;

pub use admin_handlers::*;
pub use catalog_handlers::*;
pub use funding_handlers::*;
