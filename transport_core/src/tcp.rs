//! TCP transport: one connection per call, JSON line frames, write-side
//! shutdown as the send half-close.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::debug;

use greet_core::error::TransportError;
use greet_core::{GreetTransport, HelloRequest, HelloResponse, Method, RecvHalf, SendHalf};

use crate::wire::{decode_line, encode_line, CallHeader};

/// Dials `addr` once per call. Cheap to construct and to clone.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    addr: String,
}

impl TcpTransport {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait]
impl GreetTransport for TcpTransport {
    type Tx = TcpSendHalf;
    type Rx = TcpRecvHalf;

    async fn open(&self, method: Method) -> Result<(Self::Tx, Self::Rx), TransportError> {
        let stream = TcpStream::connect(&self.addr).await?;
        debug!(addr = %self.addr, ?method, "stream opened");
        let (read, write) = stream.into_split();

        let mut tx = TcpSendHalf { writer: write };
        tx.write_line(&encode_line(&CallHeader { call: method })?)
            .await?;

        let rx = TcpRecvHalf {
            lines: BufReader::new(read).lines(),
        };
        Ok((tx, rx))
    }
}

pub struct TcpSendHalf {
    writer: OwnedWriteHalf,
}

impl TcpSendHalf {
    async fn write_line(&mut self, line: &str) -> Result<(), TransportError> {
        self.writer.write_all(line.as_bytes()).await?;
        Ok(())
    }
}

#[async_trait]
impl SendHalf for TcpSendHalf {
    async fn send(&mut self, req: HelloRequest) -> Result<(), TransportError> {
        let line = encode_line(&req)?;
        self.write_line(&line).await
    }

    async fn close_send(mut self) -> Result<(), TransportError> {
        // FIN on the write direction; the read direction stays open.
        self.writer.shutdown().await?;
        Ok(())
    }
}

pub struct TcpRecvHalf {
    lines: Lines<BufReader<OwnedReadHalf>>,
}

#[async_trait]
impl RecvHalf for TcpRecvHalf {
    async fn recv(&mut self) -> Result<Option<HelloResponse>, TransportError> {
        match self.lines.next_line().await? {
            None => Ok(None),
            Some(line) => decode_line(&line).map(Some),
        }
    }
}
