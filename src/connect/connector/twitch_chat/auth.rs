use crate::{app_config::AppConfig, connect::error::ConnectorError};
use async_trait::async_trait;

#[async_trait]
pub trait AccessTokenDispenser {
    async fn get(&mut self) -> Result<&str, ConnectorError>;
}

/// Hands out the chat token from the configuration on every (re)connect.
/// Refreshing tokens is left to whoever provisions the environment.
pub struct StaticAccessTokenDispenser {
    access_token: String,
}

impl StaticAccessTokenDispenser {
    pub fn new(app_config: &AppConfig) -> Self {
        Self {
            access_token: app_config.bot_token().to_owned(),
        }
    }
}

#[async_trait]
impl AccessTokenDispenser for StaticAccessTokenDispenser {
    async fn get(&mut self) -> Result<&str, ConnectorError> {
        log::debug!("Requesting access token");
        if self.access_token.is_empty() {
            return Err(ConnectorError::MissingAccessToken(
                "TWITCH_CHAT_TOKEN is empty".to_owned(),
            ));
        }
        Ok(self.access_token.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dispensing_configured_token() {
        let mut dispenser = StaticAccessTokenDispenser::new(&AppConfig::for_tests());
        assert_eq!(dispenser.get().await.unwrap(), "ACCESS_TOKEN");
    }

    #[tokio::test]
    async fn empty_token_is_an_error() {
        let mut app_config = AppConfig::for_tests();
        app_config.bot_token = String::new();
        let mut dispenser = StaticAccessTokenDispenser::new(&app_config);
        assert!(matches!(
            dispenser.get().await,
            Err(ConnectorError::MissingAccessToken(_))
        ));
    }
}
