use tracing::info;

use server::config::ServerConfig;
use server::GreetServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _ = dotenv::dotenv();

    let config = ServerConfig::from_env();
    info!("Starting greet server on port {}", config.port);

    let server = GreetServer::bind(&config.bind_addr()).await?;
    server.serve().await
}
