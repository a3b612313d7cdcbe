//! CLI for PushHub
//!
//! Subcommands:
//! - `server`: run the broker, the periodic publisher and the WebSocket server
//! - `client`: connect, optionally publish one payload, and print what arrives

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use pushhub::broker::{Broker, spawn};
use pushhub::config::{Settings, load_config};
use pushhub::publisher::Ticker;
use pushhub::transport::message::{ClientMessage, ServerMessage};
use pushhub::transport::websocket::start_websocket_server;
use pushhub::utils::logging;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "pushhub")]
enum Command {
    /// Start the broadcast server
    Server,
    /// Connect to a server and print the events it pushes
    Client {
        /// WebSocket server URL to connect to
        #[arg(long, default_value = "ws://127.0.0.1:8080")]
        url: String,
        /// Publish this payload once connected
        #[arg(long)]
        publish: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cmd = Command::parse();

    let settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            logging::init("info");
            error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    logging::init(&settings.log.level);

    let result = match cmd {
        Command::Server => run_server(settings).await,
        Command::Client { url, publish } => run_client(&url, publish).await,
    };

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run_server(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let (broker, _broker_task) = spawn(Broker::new());
    let shutdown = CancellationToken::new();

    if settings.publisher.enabled {
        let ticker = Ticker::new(broker.clone(), settings.publisher.interval());
        tokio::spawn(ticker.run(shutdown.clone()));
    }

    let addr = settings.server.addr();
    tokio::select! {
        result = start_websocket_server(&addr, broker, settings.broker.clone()) => {
            result?;
            error!("WebSocket server exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    shutdown.cancel();
    Ok(())
}

async fn run_client(url: &str, publish: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let (mut ws_stream, _response) = connect_async(url).await?;
    info!("Connected to {url}");

    if let Some(payload) = publish {
        let frame = serde_json::to_string(&ClientMessage::Publish { payload })?;
        ws_stream.send(WsMessage::Text(frame.into())).await?;
    }

    while let Some(msg) = ws_stream.next().await {
        match msg? {
            WsMessage::Text(text) => match serde_json::from_str::<ServerMessage>(text.as_str()) {
                Ok(ServerMessage::Connected { client_id }) => info!("Registered as {client_id}"),
                Ok(ServerMessage::Event { data }) => println!("{data}"),
                Err(e) => warn!("Unexpected frame: {e}"),
            },
            WsMessage::Close(_) => break,
            _ => {}
        }
    }

    info!("Server closed the stream");
    Ok(())
}
