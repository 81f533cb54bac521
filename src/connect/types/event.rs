use super::{RaidEvent, TextMessage};

#[derive(Debug, PartialEq)]
pub enum ChatEvent {
    TextMessage(TextMessage),
    Raid(RaidEvent),
}
