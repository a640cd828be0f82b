//! Demo greeting service speaking the `transport_core` wire protocol.
//!
//! Exists so the client binary and the end-to-end tests have a real
//! peer. Handlers are deliberately trivial; the interesting contract is
//! the framing and the per-direction close behavior.

pub mod config;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn, Instrument};

use greet_core::{HelloRequest, HelloResponse, Method};
use transport_core::wire::{decode_line, encode_line, CallHeader};

pub struct GreetServer {
    listener: TcpListener,
}

impl GreetServer {
    pub async fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}. Try a different PORT."))?;
        info!("Greet server listening on {}", listener.local_addr()?);
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().context("Failed to get local address")
    }

    /// Accept loop: one task per connection. A bad connection is logged
    /// and dropped; it never takes the accept loop down.
    pub async fn serve(self) -> Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await.context("accept failed")?;
            let conn_id = uuid::Uuid::new_v4();
            let span = tracing::info_span!("conn", id = %conn_id, peer = %peer);
            tokio::spawn(
                async move {
                    if let Err(e) = handle_connection(stream).await {
                        warn!("connection ended with error: {e:#}");
                    }
                }
                .instrument(span),
            );
        }
    }
}

async fn handle_connection(stream: TcpStream) -> Result<()> {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    let header_line = lines
        .next_line()
        .await?
        .context("connection closed before the call header")?;
    let header: CallHeader = decode_line(&header_line)?;
    info!(call = ?header.call, "call started");

    match header.call {
        Method::SayHello => say_hello(&mut write).await?,
        Method::SayHelloServerStreaming => say_hello_server_streaming(&mut lines, &mut write).await?,
        Method::SayHelloClientStreaming => say_hello_client_streaming(&mut lines, &mut write).await?,
        Method::SayHelloBidiStreaming => say_hello_bidi_streaming(&mut lines, &mut write).await?,
    }

    info!(call = ?header.call, "call finished");
    Ok(())
}

/// Unary: no request payload, one fixed reply.
async fn say_hello(write: &mut OwnedWriteHalf) -> Result<()> {
    write_response(write, "Hello".to_string()).await
}

/// Server-streaming: collect the names, then one greeting per name.
async fn say_hello_server_streaming(
    lines: &mut Lines<BufReader<OwnedReadHalf>>,
    write: &mut OwnedWriteHalf,
) -> Result<()> {
    let names = read_names(lines).await?;
    for name in &names {
        write_response(write, greeting(name)).await?;
    }
    Ok(())
}

/// Client-streaming: collect the names, reply with one combined
/// greeting after the client half-closes.
async fn say_hello_client_streaming(
    lines: &mut Lines<BufReader<OwnedReadHalf>>,
    write: &mut OwnedWriteHalf,
) -> Result<()> {
    let names = read_names(lines).await?;
    write_response(write, combined_greeting(&names)).await
}

/// Bidi: greet each name as it arrives.
async fn say_hello_bidi_streaming(
    lines: &mut Lines<BufReader<OwnedReadHalf>>,
    write: &mut OwnedWriteHalf,
) -> Result<()> {
    while let Some(line) = lines.next_line().await? {
        let req: HelloRequest = decode_line(&line)?;
        write_response(write, greeting(&req.name)).await?;
    }
    Ok(())
}

/// Drain request lines until the client half-closes.
async fn read_names(lines: &mut Lines<BufReader<OwnedReadHalf>>) -> Result<Vec<String>> {
    let mut names = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let req: HelloRequest = decode_line(&line)?;
        names.push(req.name);
    }
    Ok(names)
}

async fn write_response(write: &mut OwnedWriteHalf, message: String) -> Result<()> {
    let line = encode_line(&HelloResponse { message })?;
    write.write_all(line.as_bytes()).await?;
    Ok(())
}

fn greeting(name: &str) -> String {
    format!("Hello {name}")
}

fn combined_greeting(names: &[String]) -> String {
    if names.is_empty() {
        "Hello".to_string()
    } else {
        format!("Hello {}", names.join(", "))
    }
}
