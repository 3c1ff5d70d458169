mod actors;
mod moderation_log;
mod notifications;
mod reports;
mod stats;

pub use actors::*;
pub use moderation_log::*;
pub use notifications::*;
pub use reports::*;
pub use stats::*;
