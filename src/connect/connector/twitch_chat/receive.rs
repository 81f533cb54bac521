use crate::connect::{
    types::{parse_emote_map, RaidEvent, TextMessage, UserInfo},
    ChatEvent,
};
use std::collections::HashMap;

const TAG_DISPLAY_NAME: &str = "display-name";
const TAG_EMOTES: &str = "emotes";
const TAG_MESSAGE_ID: &str = "msg-id";
const TAG_RAIDER_DISPLAY_NAME: &str = "msg-param-displayName";
const TAG_RAIDER_LOGIN: &str = "msg-param-login";
const TAG_RAID_VIEWER_COUNT: &str = "msg-param-viewerCount";

#[derive(Debug, PartialEq)]
pub enum ConnectorEvent {
    Ping,
    Reconnect,
}

#[derive(Debug, PartialEq)]
pub enum ReceiveEvent {
    ChatEvent(ChatEvent),
    ConnectorEvent(ConnectorEvent),
}

/// One raw IRC line split into its parts.
/// `@tags :prefix COMMAND params`
#[derive(Debug, PartialEq)]
struct IrcLine<'a> {
    tags: HashMap<String, String>,
    prefix: Option<&'a str>,
    command: &'a str,
    params: &'a str,
}

impl<'a> IrcLine<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        enum ParsingState {
            Start,
            Tags,
            AfterTags,
            Prefix,
            Command,
        }
        use ParsingState::*;

        let line = line.trim_end_matches(&['\r', '\n'][..]);
        let mut state = Start;
        let mut marker = 0;
        let mut tags = HashMap::<String, String>::new();
        let mut prefix = None;

        for (i, codepoint) in line.char_indices() {
            match state {
                Start => match codepoint {
                    '@' => {
                        state = Tags;
                        marker = i + 1;
                    }
                    ':' => {
                        state = Prefix;
                        marker = i + 1;
                    }
                    ' ' => return None,
                    _ => {
                        state = Command;
                        marker = i;
                    }
                },
                // @badge-info=;badges=;display-name=carkhy;emotes=25:0-4 :carkhy!...
                Tags => {
                    if codepoint == ' ' {
                        tags = parse_tags(&line[marker..i]);
                        state = AfterTags;
                    }
                }
                AfterTags => match codepoint {
                    ':' => {
                        state = Prefix;
                        marker = i + 1;
                    }
                    ' ' => return None,
                    _ => {
                        state = Command;
                        marker = i;
                    }
                },
                // :carkhy!carkhy@carkhy.tmi.twitch.tv
                Prefix => {
                    if codepoint == ' ' {
                        prefix = Some(&line[marker..i]);
                        state = AfterTags;
                    }
                }
                // PRIVMSG #channel :text
                Command => {
                    if codepoint == ' ' {
                        return Some(Self {
                            tags,
                            prefix,
                            command: &line[marker..i],
                            params: &line[(i + 1)..],
                        });
                    }
                }
            }
        }
        match state {
            // RECONNECT, :tmi.twitch.tv RECONNECT
            Command => Some(Self {
                tags,
                prefix,
                command: &line[marker..],
                params: "",
            }),
            _ => None,
        }
    }

    fn user_login(&self) -> Option<&'a str> {
        self.prefix
            .and_then(|prefix| prefix.split_once('!'))
            .map(|(login, _)| login)
            .filter(|login| !login.is_empty())
    }

    fn trailing(&self) -> Option<&'a str> {
        if let Some(trailing) = self.params.strip_prefix(':') {
            Some(trailing)
        } else {
            self.params.split_once(" :").map(|(_, trailing)| trailing)
        }
    }

    fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

impl ReceiveEvent {
    pub fn parse_from_message(message: &str) -> Option<Self> {
        let line = IrcLine::parse(message)?;
        match line.command {
            "PING" => Some(ReceiveEvent::ConnectorEvent(ConnectorEvent::Ping)),
            "RECONNECT" => Some(ReceiveEvent::ConnectorEvent(ConnectorEvent::Reconnect)),
            "PRIVMSG" => ReceiveEvent::parse_text_message(&line),
            "USERNOTICE" => ReceiveEvent::parse_user_notice(&line),
            _ => None,
        }
    }

    fn parse_text_message(line: &IrcLine) -> Option<Self> {
        let user = UserInfo {
            name: line.user_login()?.to_owned(),
            display_name: line.tag(TAG_DISPLAY_NAME).map(String::from),
        };
        let text = line.trailing()?.trim();
        Some(ReceiveEvent::ChatEvent(ChatEvent::TextMessage(
            TextMessage {
                text: text.to_owned(),
                user,
                emotes: line.tag(TAG_EMOTES).and_then(parse_emote_map),
            },
        )))
    }

    // Only raids are relayed, subs and other notices are dropped here.
    fn parse_user_notice(line: &IrcLine) -> Option<Self> {
        if line.tag(TAG_MESSAGE_ID) != Some("raid") {
            return None;
        }
        let username = line
            .tag(TAG_RAIDER_DISPLAY_NAME)
            .or_else(|| line.tag(TAG_RAIDER_LOGIN))?;
        let viewers = match line.tag(TAG_RAID_VIEWER_COUNT).map(str::parse::<u64>) {
            Some(Ok(viewers)) => viewers,
            _ => {
                log::warn!(
                    "Dropping raid notice from {} without a valid viewer count",
                    username
                );
                return None;
            }
        };
        Some(ReceiveEvent::ChatEvent(ChatEvent::Raid(RaidEvent {
            username: username.to_owned(),
            viewers,
        })))
    }
}

fn parse_tags(tags_string: &str) -> HashMap<String, String> {
    tags_string
        .split(';')
        .map(|key_val_pair| {
            let mut key_val_split = key_val_pair.splitn(2, '=');
            (
                key_val_split.next().unwrap_or_default().to_owned(),
                unescape_tag_value(key_val_split.next().unwrap_or_default()),
            )
        })
        .collect()
}

// https://ircv3.net/specs/extensions/message-tags#escaping-values
fn unescape_tag_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(codepoint) = chars.next() {
        if codepoint != '\\' {
            unescaped.push(codepoint);
            continue;
        }
        match chars.next() {
            Some(':') => unescaped.push(';'),
            Some('s') => unescaped.push(' '),
            Some('r') => unescaped.push('\r'),
            Some('n') => unescaped.push('\n'),
            Some(other) => unescaped.push(other),
            None => (),
        }
    }
    unescaped
}
