use std::fmt;

const CAPABILITIES: [&str; 2] = ["tags", "commands"];

/// Capabilities come first so every line from the join onward carries tags.
pub fn get_login_tasks(password: &str, user_name: &str, channel: &str) -> Vec<SendTask> {
    let mut tasks: Vec<SendTask> = CAPABILITIES
        .iter()
        .map(|capability| SendTask::RequestCapabilities((*capability).to_owned()))
        .collect();
    tasks.extend([
        SendTask::ProvideLoginPassword(password.to_owned()),
        SendTask::ProvideLoginUserName(user_name.to_owned()),
        SendTask::JoinChannel(channel.to_owned()),
    ]);
    tasks
}

#[derive(Debug, PartialEq)]
pub enum SendTask {
    PrivateMessage(String, String),
    ProvideLoginPassword(String),
    ProvideLoginUserName(String),
    JoinChannel(String),
    RequestCapabilities(String),
    Pong,
}

impl SendTask {
    /// The line as it may appear in logs; the password never does.
    pub fn redacted(&self) -> String {
        match self {
            Self::ProvideLoginPassword(_) => "PASS oauth:***".to_owned(),
            task => task.to_string(),
        }
    }
}

impl fmt::Display for SendTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // a line break would end the IRC line early
            Self::PrivateMessage(channel, message) => write!(
                f,
                "PRIVMSG #{} :{}",
                channel,
                message.replace(['\r', '\n'], " ")
            ),
            Self::ProvideLoginPassword(password) => write!(f, "PASS oauth:{}", password),
            Self::ProvideLoginUserName(user_name) => write!(f, "NICK {}", user_name),
            Self::JoinChannel(channel) => write!(f, "JOIN #{}", channel),
            Self::RequestCapabilities(capability_name) => {
                write!(f, "CAP REQ :twitch.tv/{}", capability_name)
            }
            Self::Pong => write!(f, "PONG :tmi.twitch.tv"),
        }
    }
}
