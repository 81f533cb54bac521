use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("No access token available: {0}")]
    MissingAccessToken(String),
    // Errors for other crates
    #[error("Error in crate 'tungstenite': {0:?}")]
    WebsocketError(#[from] tungstenite::Error),
}
