use crate::{
    publish::{EventPublisher, Topic},
    ticker::{RotationScheduler, ScheduleSource, TickerItem},
};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{
    accept_async,
    tungstenite::{self, Message},
};

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("Websocket error: {0}")]
    Websocket(#[from] tungstenite::Error),
    #[error("Could not serialize overlay payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpcomingStream<'a> {
    upcoming_stream: Option<&'a TickerItem>,
}

/// Websocket endpoint for the overlay page. Each connection gets chat and raid
/// events as they are published and its own ticker rotation.
#[derive(Debug, Clone)]
pub struct OverlayServer {
    publisher: EventPublisher,
    schedule: ScheduleSource,
    scheduler: RotationScheduler,
}

impl OverlayServer {
    pub fn new(
        publisher: EventPublisher,
        schedule: ScheduleSource,
        scheduler: RotationScheduler,
    ) -> Self {
        Self {
            publisher,
            schedule,
            scheduler,
        }
    }

    pub async fn serve(self, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    let server = self.clone();
                    tokio::spawn(async move {
                        if let Err(err) = server.handle_connection(stream, addr).await {
                            log::warn!("Overlay connection {} failed: {}", addr, err);
                        }
                    });
                }
                Err(err) => log::error!("Failed to accept overlay connection: {}", err),
            }
        }
    }

    async fn handle_connection(
        &self,
        stream: TcpStream,
        addr: SocketAddr,
    ) -> Result<(), OverlayError> {
        let ws_stream = accept_async(stream).await?;
        let (mut write, mut read) = ws_stream.split();

        let mut chat = self.publisher.subscribe(Topic::ChatMessage);
        let mut raids = self.publisher.subscribe(Topic::Raid);
        let mut rotation = self.scheduler.spawn(self.schedule.subscribe());
        log::info!(
            "Overlay connected from {} ({} overlays, {} scheduled streams)",
            addr,
            self.publisher.subscriber_count(Topic::ChatMessage),
            self.schedule.snapshot().items.len()
        );

        loop {
            let payload = tokio::select! {
                message = read.next() => match message {
                    Some(Ok(Message::Ping(data))) => {
                        write.send(Message::Pong(data)).await?;
                        continue;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        log::warn!("Overlay {} read failed: {}", addr, err);
                        break;
                    }
                    Some(Ok(_)) => continue,
                },
                Some(event) = chat.next() => serde_json::to_string(&event)?,
                Some(event) = raids.next() => serde_json::to_string(&event)?,
                Some(frame) = rotation.next() => serde_json::to_string(&UpcomingStream {
                    upcoming_stream: frame.as_ref(),
                })?,
            };
            log::trace!("=> {} {}", addr, payload);
            write.send(Message::Text(payload)).await?;
        }
        self.publisher.unsubscribe(chat);
        self.publisher.unsubscribe(raids);
        log::info!("Overlay {} disconnected", addr);
        Ok(())
    }
}
