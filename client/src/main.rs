mod config;

use anyhow::Result;
use tracing::{error, info};

use greet_core::calls::GreetClient;
use greet_core::{HelloRequest, HelloResponse};
use transport_core::TcpTransport;

use crate::config::{CallShape, ClientConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _ = dotenv::dotenv();

    let config = ClientConfig::from_env();
    info!(
        "Greet client: server={}, call={:?}, names={:?}",
        config.server_addr, config.call, config.names
    );

    let transport = TcpTransport::new(config.server_addr.clone());
    let client = GreetClient::with_options(transport, config.call_options());
    let requests: Vec<HelloRequest> = config
        .names
        .iter()
        .map(|name| HelloRequest::new(name.clone()))
        .collect();

    match config.call {
        CallShape::Unary => {
            let res = client.say_hello().await?;
            info!("{}", res.message);
        }
        CallShape::ServerStreaming => {
            client
                .say_hello_server_streaming(requests, log_sink())
                .await?;
        }
        CallShape::ClientStreaming => {
            let res = client.say_hello_client_streaming(requests).await?;
            info!("{}", res.message);
        }
        CallShape::BidiStreaming => {
            let outcome = client.say_hello_bidi_streaming(requests, log_sink()).await?;
            if let Some(err) = &outcome.sender_error {
                error!("send direction failed: {err}");
            }
            if let Some(err) = &outcome.receiver_error {
                error!("receive direction failed: {err}");
            }
            if !outcome.is_ok() {
                anyhow::bail!("bidirectional call finished with errors");
            }
        }
    }

    Ok(())
}

/// Sink that logs each response as it arrives.
fn log_sink() -> impl FnMut(HelloResponse) + Send + 'static {
    |res| info!("{}", res.message)
}
