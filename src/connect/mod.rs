mod connector;
mod error;
pub(crate) mod types;

pub use connector::{connect_to_twitch_chat, StaticAccessTokenDispenser};
pub use types::{ChatEvent, ChatMessage, RaidEvent, TextMessage, UserInfo};
