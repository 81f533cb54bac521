use super::{
    auth::AccessTokenDispenser,
    receive::{ConnectorEvent, ReceiveEvent},
    retry_manager::ExponentialRetryManager,
    send::{get_login_tasks, SendTask},
};
use crate::{
    app_config::AppConfig,
    connect::{error::ConnectorError, ChatEvent},
};
use futures::{
    channel::mpsc,
    future::{select, Either, TryFutureExt},
    lock::Mutex,
    pin_mut, Sink, SinkExt, Stream, StreamExt,
};
use futures_retry::FutureRetry;
use std::time::Duration;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, Message},
};

const INIT_RECONNECT_WAIT: Duration = Duration::from_secs(1);
const MAX_RECONNECT_WAIT: Duration = Duration::from_secs(60);
const PAUSE_AFTER_DROP: Duration = Duration::from_secs(1);

#[derive(Debug, PartialEq)]
enum ConnectionEnd {
    /// The chat server went away or asked us to reconnect.
    Dropped,
    /// Nobody listens to chat events or sends replies anymore.
    RelayClosed,
}

async fn send_task(
    sender: &Mutex<impl Sink<Message, Error = tungstenite::Error> + Unpin>,
    task: SendTask,
) -> Result<(), ConnectorError> {
    log::debug!("-> {}", task.redacted());
    sender.lock().await.send(Message::Text(task.to_string())).await?;
    Ok(())
}

async fn handle_input(
    receiver: &mut (impl Stream<Item = Result<Message, tungstenite::Error>> + Unpin),
    relay_sender: &mut (impl Sink<ChatEvent, Error = mpsc::SendError> + Unpin),
    internal_sender: mpsc::UnboundedSender<ConnectorEvent>,
) -> ConnectionEnd {
    while let Some(message) = receiver.next().await {
        let text_message = match message {
            Ok(Message::Text(text_message)) => text_message,
            Ok(Message::Close(frame)) => {
                log::warn!("Chat server closed the connection: {:?}", frame);
                return ConnectionEnd::Dropped;
            }
            Ok(_) => continue,
            Err(err) => {
                log::warn!("Reading from chat server failed: {}", err);
                return ConnectionEnd::Dropped;
            }
        };
        log::debug!("<- {}", text_message.trim());
        let received_events = text_message
            .lines()
            .filter_map(ReceiveEvent::parse_from_message);
        for event in received_events {
            match event {
                ReceiveEvent::ChatEvent(chat_event) => {
                    if relay_sender.send(chat_event).await.is_err() {
                        return ConnectionEnd::RelayClosed;
                    }
                }
                ReceiveEvent::ConnectorEvent(ConnectorEvent::Reconnect) => {
                    log::info!("Chat server asked for a reconnect");
                    return ConnectionEnd::Dropped;
                }
                ReceiveEvent::ConnectorEvent(connector_event) => {
                    if internal_sender.unbounded_send(connector_event).is_err() {
                        return ConnectionEnd::Dropped;
                    }
                }
            }
        }
    }
    log::warn!("Input handler stopped");
    ConnectionEnd::Dropped
}

async fn handle_output(
    sender: &Mutex<impl Sink<Message, Error = tungstenite::Error> + Unpin>,
    relay_receiver: &mut (impl Stream<Item = String> + Unpin),
    mut internal_receiver: mpsc::UnboundedReceiver<ConnectorEvent>,
    channel: &str,
) -> ConnectionEnd {
    let internal_output_fut = async {
        while let Some(event) = internal_receiver.next().await {
            if event == ConnectorEvent::Ping {
                send_task(sender, SendTask::Pong).await?;
            }
        }
        log::warn!("Internal output handler stopped");
        Ok::<_, ConnectorError>(ConnectionEnd::Dropped)
    };
    let relay_output_fut = async {
        while let Some(message) = relay_receiver.next().await {
            send_task(sender, SendTask::PrivateMessage(channel.to_owned(), message)).await?;
        }
        log::warn!("Relay output handler stopped");
        Ok::<_, ConnectorError>(ConnectionEnd::RelayClosed)
    };
    pin_mut!(internal_output_fut, relay_output_fut);
    let end = match select(internal_output_fut, relay_output_fut).await {
        Either::Left((end, _)) | Either::Right((end, _)) => end,
    };
    end.unwrap_or_else(|err| {
        log::warn!("Writing to chat server failed: {}", err);
        ConnectionEnd::Dropped
    })
}

async fn connect_to_twitch_chat_with_connection(
    from_relay: &mut (impl Stream<Item = String> + Unpin),
    to_relay: &mut (impl Sink<ChatEvent, Error = mpsc::SendError> + Unpin),
    mut from_websocket: impl Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
    to_websocket: impl Sink<Message, Error = tungstenite::Error> + Unpin,
    app_config: &AppConfig,
    access_token_dispenser: &mut impl AccessTokenDispenser,
) -> Result<ConnectionEnd, ConnectorError> {
    let access_token = access_token_dispenser.get().await?.to_owned();
    let to_websocket = Mutex::new(to_websocket);

    let login_tasks = get_login_tasks(
        &access_token,
        app_config.bot_user_name(),
        app_config.channel_name(),
    );
    for task in login_tasks {
        send_task(&to_websocket, task).await?;
    }

    let (internal_tx, internal_rx) = mpsc::unbounded::<ConnectorEvent>();
    let input_fut = handle_input(&mut from_websocket, to_relay, internal_tx);
    let output_fut = handle_output(
        &to_websocket,
        from_relay,
        internal_rx,
        app_config.channel_name(),
    );
    pin_mut!(input_fut, output_fut);
    let end = match select(input_fut, output_fut).await {
        Either::Left((end, _)) | Either::Right((end, _)) => end,
    };
    Ok(end)
}

/// Keeps the bot in the configured channel until the relay side goes away.
/// Chat events flow into `to_relay`, every string from `from_relay` is sent
/// to the channel as a chat message.
pub async fn connect_to_twitch_chat(
    mut from_relay: impl Stream<Item = String> + Unpin,
    mut to_relay: impl Sink<ChatEvent, Error = mpsc::SendError> + Unpin,
    app_config: &AppConfig,
    access_token_dispenser: &mut impl AccessTokenDispenser,
) -> Result<(), ConnectorError> {
    loop {
        let ws_stream = FutureRetry::new(
            || {
                connect_async(app_config.chat_server())
                    .map_ok(|(ws_stream, _)| ws_stream)
                    .err_into::<ConnectorError>()
            },
            ExponentialRetryManager::new(INIT_RECONNECT_WAIT, MAX_RECONNECT_WAIT, None),
        )
        .await
        .map(|val| val.0)
        .map_err(|err| err.0)?;
        log::info!("Connected to {}", app_config.chat_server());

        let (ws_write, ws_read) = ws_stream.split();
        match connect_to_twitch_chat_with_connection(
            &mut from_relay,
            &mut to_relay,
            ws_read,
            ws_write,
            app_config,
            access_token_dispenser,
        )
        .await
        {
            Ok(ConnectionEnd::RelayClosed) => {
                log::info!("Relay closed, leaving the chat");
                return Ok(());
            }
            Ok(ConnectionEnd::Dropped) => {
                log::warn!("Connection dropped, connection will be re-established");
            }
            Err(ConnectorError::WebsocketError(err)) => {
                log::warn!("Login failed ({}), connection will be re-established", err);
            }
            Err(err) => return Err(err),
        }
        tokio::time::sleep(PAUSE_AFTER_DROP).await;
    }
}
