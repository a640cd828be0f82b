//! In-memory stream pair for tests and examples: the two directions
//! are bounded mpsc channels, dropping a sender is the close signal,
//! and the peer side can inject transport errors.

use async_trait::async_trait;
use tokio::sync::mpsc;

use greet_core::error::TransportError;
use greet_core::{HelloRequest, HelloResponse, RecvHalf, SendHalf};

/// Create a connected stream: client halves plus the peer's end.
pub fn pair(buffer: usize) -> (MemSendHalf, MemRecvHalf, ServerEnd) {
    let (req_tx, req_rx) = mpsc::channel(buffer);
    let (res_tx, res_rx) = mpsc::channel(buffer);
    (
        MemSendHalf { tx: req_tx },
        MemRecvHalf { rx: res_rx },
        ServerEnd {
            requests: req_rx,
            responses: res_tx,
        },
    )
}

pub struct MemSendHalf {
    tx: mpsc::Sender<HelloRequest>,
}

#[async_trait]
impl SendHalf for MemSendHalf {
    async fn send(&mut self, req: HelloRequest) -> Result<(), TransportError> {
        self.tx
            .send(req)
            .await
            .map_err(|_| TransportError::ConnectionClosed)
    }

    async fn close_send(self) -> Result<(), TransportError> {
        // Dropping the sender closes the request channel: the peer's
        // `requests.recv()` starts returning `None`.
        Ok(())
    }
}

pub struct MemRecvHalf {
    rx: mpsc::Receiver<Result<HelloResponse, TransportError>>,
}

#[async_trait]
impl RecvHalf for MemRecvHalf {
    async fn recv(&mut self) -> Result<Option<HelloResponse>, TransportError> {
        match self.rx.recv().await {
            Some(Ok(res)) => Ok(Some(res)),
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }
}

/// The peer's side of an in-memory stream. Dropping `responses` ends
/// the client's receive direction cleanly.
pub struct ServerEnd {
    pub requests: mpsc::Receiver<HelloRequest>,
    pub responses: mpsc::Sender<Result<HelloResponse, TransportError>>,
}

impl ServerEnd {
    pub async fn reply(&self, message: impl Into<String>) -> bool {
        self.responses
            .send(Ok(HelloResponse {
                message: message.into(),
            }))
            .await
            .is_ok()
    }

    pub async fn fail(&self, err: TransportError) -> bool {
        self.responses.send(Err(err)).await.is_ok()
    }
}
