use super::{EmoteMap, UserInfo};

#[derive(Debug, PartialEq)]
pub struct TextMessage {
    pub text: String,
    pub user: UserInfo,
    pub emotes: Option<EmoteMap>,
}
