use crate::{
    connect::{ChatMessage, UserInfo},
    json_file::{read_json, JsonFileError},
};
use std::{collections::HashMap, path::Path};

pub const COMMAND_NOT_FOUND_MESSAGE: &str = "Command not found";

// Triggers without their prefix, the configured prefix is put in front.
const DEFAULT_COMMANDS: [(&str, &str); 3] = [
    ("uses", "https://theworst.dev/uses"),
    ("schedule", "https://go.apollo.dev/events-calendar"),
    (
        "coc",
        "https://www.apollographql.com/docs/community/code-of-conduct/",
    ),
];

/// What a command produces: the chat reply and the line shown on the overlay.
#[derive(Debug, PartialEq)]
pub struct CommandResponse {
    pub reply: String,
    pub chat_message: ChatMessage,
}

#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    prefix: char,
    commands: HashMap<String, String>,
}

impl CommandDispatcher {
    pub fn new(prefix: char, commands: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            prefix,
            commands: commands
                .into_iter()
                .map(|(trigger, response)| (trigger.trim().to_lowercase(), response))
                .collect(),
        }
    }

    pub fn with_default_commands(prefix: char) -> Self {
        Self::new(
            prefix,
            DEFAULT_COMMANDS
                .iter()
                .map(|(name, response)| (format!("{}{}", prefix, name), (*response).to_owned())),
        )
    }

    /// Loads a JSON object mapping full triggers (`"!uses"`) to response texts.
    pub async fn from_file(prefix: char, path: &Path) -> Result<Self, JsonFileError> {
        let commands: HashMap<String, String> = read_json(path).await?;
        log::info!("Loaded {} commands from {:?}", commands.len(), path);
        Ok(Self::new(prefix, commands))
    }

    pub fn is_command(&self, text: &str) -> bool {
        text.starts_with(self.prefix)
    }

    fn lookup(&self, text: &str) -> Option<&str> {
        self.commands
            .get(&text.to_lowercase())
            .map(String::as_str)
    }

    pub fn dispatch(&self, text: &str, sender: &UserInfo) -> CommandResponse {
        let reply = match self.lookup(text) {
            Some(response) => {
                log::info!("Executing command {:?} for {}", text, sender.name);
                response
            }
            None => {
                log::info!("Unknown command {:?} from {}", text, sender.name);
                COMMAND_NOT_FOUND_MESSAGE
            }
        };
        CommandResponse {
            reply: reply.to_owned(),
            chat_message: ChatMessage::new(sender.display_name(), reply, None),
        }
    }
}
