use super::CommandDispatcher;
use crate::{
    app_config::AppConfig,
    connect::{ChatEvent, ChatMessage, TextMessage},
    publish::{EventPublisher, OverlayEvent},
};
use futures::{
    channel::mpsc::{UnboundedReceiver, UnboundedSender},
    StreamExt,
};

/// Routes chat events: commands get answered, everything else goes to the overlay.
#[derive(Debug)]
pub struct Relay {
    /// Login whose messages are dropped; `None` when the bot chats as the broadcaster.
    bot_login: Option<String>,
    dispatcher: CommandDispatcher,
    publisher: EventPublisher,
}

impl Relay {
    pub fn new(
        app_config: &AppConfig,
        dispatcher: CommandDispatcher,
        publisher: EventPublisher,
    ) -> Self {
        Self {
            bot_login: app_config.separate_bot_user().map(String::from),
            dispatcher,
            publisher,
        }
    }

    fn handle_text_message(&self, text_message: TextMessage) -> Option<String> {
        let own_login = self
            .bot_login
            .as_deref()
            .filter(|login| text_message.user.is(login));
        if let Some(login) = own_login {
            log::trace!("Ignoring own message from {}: {:?}", login, text_message.text);
            return None;
        }
        if self.dispatcher.is_command(&text_message.text) {
            let response = self
                .dispatcher
                .dispatch(&text_message.text, &text_message.user);
            self.publisher
                .publish(OverlayEvent::Chat(response.chat_message));
            Some(response.reply)
        } else {
            self.publisher.publish(OverlayEvent::Chat(
                ChatMessage::from_text_message(&text_message),
            ));
            None
        }
    }

    fn handle_event(&self, event: ChatEvent) -> Option<String> {
        match event {
            ChatEvent::TextMessage(text_message) => self.handle_text_message(text_message),
            ChatEvent::Raid(raid) => {
                log::info!("{} raided with {} viewers", raid.username, raid.viewers);
                self.publisher.publish(OverlayEvent::Raid(raid));
                None
            }
        }
    }

    pub async fn run(
        &self,
        mut receiver: UnboundedReceiver<ChatEvent>,
        sender: UnboundedSender<String>,
    ) {
        while let Some(event) = receiver.next().await {
            if let Some(response) = self.handle_event(event) {
                if sender.unbounded_send(response).is_err() {
                    log::warn!("Chat connection is gone, dropping replies");
                    break;
                }
            }
        }
        log::warn!("Relay stopped");
    }
}
