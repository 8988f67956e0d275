mod batch;
mod compile;
mod enter;
mod link;
mod selfhost;
mod sources;
mod stale;

pub use batch::cmd_batch;
pub use compile::cmd_compile;
pub use enter::cmd_enter;
pub use link::cmd_link;
pub use selfhost::cmd_self;
pub use sources::cmd_sources;
pub use stale::cmd_stale;
