//! HTTP Handlers

mod admin;
mod events;
mod funding;
mod novel;
mod ping;

pub use admin::*;
pub use events::*;
pub use funding::*;
pub use novel::*;
pub use ping::*;
