use crate::connect::{ChatMessage, RaidEvent};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    ChatMessage,
    Raid,
}

/// A payload for the overlay, serialized as `{"chat": ...}` or `{"raid": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OverlayEvent {
    #[serde(rename = "chat")]
    Chat(ChatMessage),
    #[serde(rename = "raid")]
    Raid(RaidEvent),
}

impl OverlayEvent {
    pub fn topic(&self) -> Topic {
        match self {
            Self::Chat(_) => Topic::ChatMessage,
            Self::Raid(_) => Topic::Raid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn events_are_wrapped_in_their_topic_key() {
        let raid = OverlayEvent::Raid(RaidEvent {
            username: "Carkhy".to_owned(),
            viewers: 42,
        });
        assert_eq!(raid.topic(), Topic::Raid);
        assert_eq!(
            serde_json::to_value(&raid).unwrap(),
            json!({"raid": {"username": "Carkhy", "viewers": 42}})
        );

        let chat = OverlayEvent::Chat(ChatMessage::new("Carkhy", "hi", None));
        assert_eq!(chat.topic(), Topic::ChatMessage);
        assert_eq!(
            serde_json::to_value(&chat).unwrap(),
            json!({"chat": {"displayName": "Carkhy", "message": "hi", "emotes": null}})
        );
    }
}
