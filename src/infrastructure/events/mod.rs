//! Events - 资金与解锁事件广播

mod publisher;

pub use publisher::{EventPublisher, FundingEvent};
