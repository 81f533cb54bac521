mod auth;
mod connector;
mod receive;
mod retry_manager;
pub(crate) mod send;

pub use auth::StaticAccessTokenDispenser;
pub use connector::connect_to_twitch_chat;
