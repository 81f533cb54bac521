mod chat_message;
mod event;
mod raid;
mod text_message;
mod user_info;

pub use chat_message::{parse_emote_map, ChatMessage, EmoteMap};
pub use event::ChatEvent;
pub use raid::RaidEvent;
pub use text_message::TextMessage;
pub use user_info::UserInfo;
