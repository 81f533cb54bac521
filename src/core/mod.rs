mod command;
mod relay;

pub use command::CommandDispatcher;
pub use relay::Relay;
