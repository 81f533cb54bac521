use crate::{
    connect::{ChatEvent, StaticAccessTokenDispenser},
    core::{CommandDispatcher, Relay},
    overlay::OverlayServer,
    publish::EventPublisher,
    ticker::{RotationScheduler, RotationTimings, ScheduleFile, ScheduleSource, TickerSnapshot},
};
use app_config::AppConfig;
use connect::connect_to_twitch_chat;
use flexi_logger::Logger;
use futures::channel::mpsc;
use futures::future::{select, Either};
use futures::pin_mut;
use std::error::Error;
use tokio::net::TcpListener;
pub mod app_config;
mod connect;
mod core;
mod json_file;
mod overlay;
mod publish;
mod ticker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let app_config = AppConfig::new()?;
    let _logger = Logger::try_with_str(&app_config.log_level)?.start()?;

    let dispatcher = match app_config.commands_file() {
        Some(path) => CommandDispatcher::from_file(app_config.command_prefix, path).await?,
        None => CommandDispatcher::with_default_commands(app_config.command_prefix),
    };
    let publisher = EventPublisher::new();

    let schedule = ScheduleSource::new(TickerSnapshot::default());
    match app_config.schedule_file() {
        Some(path) => {
            let schedule_file = ScheduleFile::new(path);
            tokio::spawn(schedule_file.watch(app_config.schedule_poll_interval, schedule.clone()));
        }
        None => log::info!("No SCHEDULE_FILE configured, the ticker stays empty"),
    }

    let listener = TcpListener::bind(app_config.overlay_addr).await?;
    log::info!("Overlay server listening on ws://{}", app_config.overlay_addr);
    let scheduler = RotationScheduler::new(RotationTimings::from(&app_config));
    let overlay_server = OverlayServer::new(publisher.clone(), schedule.clone(), scheduler);
    tokio::spawn(overlay_server.serve(listener));

    let (inc_tx, inc_rx) = mpsc::unbounded::<ChatEvent>();
    let (out_tx, out_rx) = mpsc::unbounded::<String>();

    let relay = Relay::new(&app_config, dispatcher, publisher);
    let relay_run = relay.run(inc_rx, out_tx);
    let mut access_token_dispenser = StaticAccessTokenDispenser::new(&app_config);
    let twitch_connection =
        connect_to_twitch_chat(out_rx, inc_tx, &app_config, &mut access_token_dispenser);
    pin_mut!(twitch_connection, relay_run);
    if let Either::Left((Err(err), _)) = select(twitch_connection, relay_run).await {
        log::error!("Chat connection failed: {}", err);
        return Err(err.into());
    }
    Ok(())
}
