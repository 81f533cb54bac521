pub(crate) mod twitch_chat;

pub use twitch_chat::{connect_to_twitch_chat, StaticAccessTokenDispenser};
