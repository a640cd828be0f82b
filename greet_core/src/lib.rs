//! Client core for the greeting RPC demo service.
//!
//! The service exposes four call shapes: unary, server-streaming,
//! client-streaming and bidirectional streaming. The heart of this
//! crate is [`duplex::run_duplex`], which coordinates the two
//! directions of a bidirectional call — a sender loop on the calling
//! task and a receiver loop on its own task, joined by a one-shot
//! completion signal. The other shapes are thin subsets of it, exposed
//! through [`calls::GreetClient`].
//!
//! Transports are pluggable: this crate only consumes the
//! [`SendHalf`]/[`RecvHalf`]/[`GreetTransport`] seam. A TCP transport
//! and an in-memory one live in `transport_core`.

pub mod calls;
pub mod completion;
pub mod duplex;
pub mod error;

#[cfg(test)]
pub(crate) mod testutil;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// One outbound request: a name to greet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloRequest {
    pub name: String,
}

impl HelloRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One inbound response from the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloResponse {
    pub message: String,
}

/// The four RPCs of the greeting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    SayHello,
    SayHelloServerStreaming,
    SayHelloClientStreaming,
    SayHelloBidiStreaming,
}

/// Send direction of an open stream.
///
/// Driven by exactly one task. `close_send` consumes the half, so a
/// send after the half-close (or a second half-close) does not compile.
#[async_trait]
pub trait SendHalf: Send + Sized {
    async fn send(&mut self, req: HelloRequest) -> Result<(), TransportError>;

    /// Half-close: tells the peer no further requests will arrive. The
    /// receive direction of the stream stays open.
    async fn close_send(self) -> Result<(), TransportError>;
}

/// Receive direction of an open stream. Driven by exactly one task;
/// safe to drive concurrently with the send half.
#[async_trait]
pub trait RecvHalf: Send {
    /// Next response from the peer. `Ok(None)` is clean end-of-stream.
    async fn recv(&mut self) -> Result<Option<HelloResponse>, TransportError>;
}

/// Seam to the transport: opens one fresh stream per call.
#[async_trait]
pub trait GreetTransport: Send + Sync {
    type Tx: SendHalf;
    type Rx: RecvHalf + 'static;

    async fn open(&self, method: Method) -> Result<(Self::Tx, Self::Rx), TransportError>;
}

/// Destination for inbound responses. Called from the receiver task in
/// arrival order; the caller must not touch shared sink state until the
/// call has returned.
pub trait ResponseSink: Send + 'static {
    fn deliver(&mut self, res: HelloResponse);
}

impl<F> ResponseSink for F
where
    F: FnMut(HelloResponse) + Send + 'static,
{
    fn deliver(&mut self, res: HelloResponse) {
        self(res)
    }
}

/// Append-only collector sink. Clone one handle into the call and keep
/// the other to read the messages after the call returns.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    messages: Arc<Mutex<Vec<HelloResponse>>>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far.
    pub fn messages(&self) -> Vec<HelloResponse> {
        self.messages.lock().expect("collector lock poisoned").clone()
    }
}

impl ResponseSink for Collector {
    fn deliver(&mut self, res: HelloResponse) {
        self.messages
            .lock()
            .expect("collector lock poisoned")
            .push(res);
    }
}

/// Pacing policy applied between consecutive sends. Exists to simulate
/// a realistic streaming cadence; correctness never depends on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Pacing {
    /// Send as fast as the transport accepts.
    #[default]
    None,
    /// Sleep this long between consecutive sends (not after the last).
    Fixed(Duration),
}

impl Pacing {
    pub(crate) async fn pause(&self) {
        if let Pacing::Fixed(delay) = self {
            tokio::time::sleep(*delay).await;
        }
    }
}

/// Per-call knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallOptions {
    pub pacing: Pacing,
    /// Upper bound on waiting for the peer to finish its send
    /// direction. `None` waits forever: a peer that never half-closes
    /// will hang the call.
    pub recv_timeout: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_on_the_wire() {
        let json = serde_json::to_string(&Method::SayHelloBidiStreaming).unwrap();
        assert_eq!(json, "\"say_hello_bidi_streaming\"");
        let back: Method = serde_json::from_str("\"say_hello\"").unwrap();
        assert_eq!(back, Method::SayHello);
    }

    #[test]
    fn collector_snapshots_in_order() {
        let collector = Collector::new();
        let mut sink = collector.clone();
        sink.deliver(HelloResponse {
            message: "a".to_string(),
        });
        sink.deliver(HelloResponse {
            message: "b".to_string(),
        });
        let messages: Vec<String> = collector.messages().into_iter().map(|m| m.message).collect();
        assert_eq!(messages, vec!["a", "b"]);
    }
}
