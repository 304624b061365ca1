//! Command implementations.

mod actives;
mod scope;
mod watch;

pub use actives::cmd_actives;
pub use scope::cmd_scope;
pub use watch::cmd_watch;
