use super::TextMessage;
use serde::Serialize;

/// Emote instances per emote code, in the order the platform reported them.
/// `25:0-4,6-10/1902:12-16` becomes `[("25", ["0-4", "6-10"]), ("1902", ["12-16"])]`.
pub type EmoteMap = Vec<(String, Vec<String>)>;

/// One emote occurrence: `(code, start, end)`, offsets as sent by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Emote(pub String, pub String, pub String);

/// A chat line as the overlay renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub display_name: String,
    pub message: String,
    pub emotes: Option<Vec<Emote>>,
}

impl ChatMessage {
    pub fn new(display_name: &str, message: &str, emote_map: Option<&EmoteMap>) -> Self {
        Self {
            display_name: display_name.to_owned(),
            message: message.to_owned(),
            emotes: emote_map.and_then(flatten_emotes),
        }
    }

    pub fn from_text_message(text_message: &TextMessage) -> Self {
        Self::new(
            text_message.user.display_name(),
            &text_message.text,
            text_message.emotes.as_ref(),
        )
    }
}

/// Parses the raw `emotes` tag. Empty or malformed tags carry no usable emote data.
pub fn parse_emote_map(tag: &str) -> Option<EmoteMap> {
    if tag.is_empty() {
        return None;
    }
    tag.split('/')
        .map(|entry| {
            let (code, instances) = entry.split_once(':')?;
            if code.is_empty() || instances.is_empty() {
                return None;
            }
            Some((
                code.to_owned(),
                instances.split(',').map(String::from).collect(),
            ))
        })
        .collect()
}

fn flatten_emotes(emote_map: &EmoteMap) -> Option<Vec<Emote>> {
    let mut emotes = Vec::new();
    for (code, instances) in emote_map {
        for instance in instances {
            let (start, end) = instance.split_once('-')?;
            emotes.push(Emote(code.to_owned(), start.to_owned(), end.to_owned()));
        }
    }
    Some(emotes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn emote(code: &str, start: &str, end: &str) -> Emote {
        Emote(code.to_owned(), start.to_owned(), end.to_owned())
    }

    #[test]
    fn flattening_instances_of_one_code() {
        let emote_map: EmoteMap = vec![("25".to_owned(), vec!["0-4".to_owned(), "6-10".to_owned()])];
        let message = ChatMessage::new("Chatter", "Kappa Kappa", Some(&emote_map));
        assert_eq!(
            message.emotes,
            Some(vec![emote("25", "0", "4"), emote("25", "6", "10")])
        );
    }

    #[test]
    fn flattening_keeps_reported_code_order() {
        let emote_map = parse_emote_map("1902:6-10/25:0-4,12-16").unwrap();
        let message = ChatMessage::new("Chatter", "Kappa Keepo Kappa", Some(&emote_map));
        assert_eq!(
            message.emotes,
            Some(vec![
                emote("1902", "6", "10"),
                emote("25", "0", "4"),
                emote("25", "12", "16"),
            ])
        );
    }

    #[test]
    fn missing_emote_data_is_none() {
        let message = ChatMessage::new("Chatter", "hello", None);
        assert_eq!(message.emotes, None);
        assert_eq!(parse_emote_map(""), None);
    }

    #[test]
    fn malformed_emote_data_is_none() {
        assert_eq!(parse_emote_map("25"), None);
        assert_eq!(parse_emote_map("25:"), None);
        let emote_map: EmoteMap = vec![("25".to_owned(), vec!["0-4".to_owned(), "6".to_owned()])];
        let message = ChatMessage::new("Chatter", "Kappa Kappa", Some(&emote_map));
        assert_eq!(message.emotes, None);
    }

    #[test]
    fn serializing_chat_payload() {
        let emote_map = parse_emote_map("25:0-4,6-10").unwrap();
        let message = ChatMessage::new("Chatter", "Kappa Kappa", Some(&emote_map));
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "displayName": "Chatter",
                "message": "Kappa Kappa",
                "emotes": [["25", "0", "4"], ["25", "6", "10"]],
            })
        );
        let message = ChatMessage::new("Chatter", "hello", None);
        assert_eq!(
            serde_json::to_value(&message).unwrap()["emotes"],
            serde_json::Value::Null
        );
    }
}
