//! The four call shapes of the greeting service, over any transport.
//!
//! Only the bidirectional shape needs real coordination; it lives in
//! [`crate::duplex`]. The rest are subsets: unary is "half-close, read
//! one", client-streaming is "send all, half-close, read one", and
//! server-streaming is a duplex call whose requests all go out up
//! front.

use tracing::info;

use crate::duplex::{run_duplex, sender_loop, DuplexOutcome};
use crate::error::{CallError, TransportError};
use crate::{
    CallOptions, GreetTransport, HelloRequest, HelloResponse, Method, Pacing, RecvHalf,
    ResponseSink, SendHalf,
};

/// Client for the greeting service. Explicitly constructed and owned by
/// the caller; one value per transport, no process-wide state.
pub struct GreetClient<T> {
    transport: T,
    options: CallOptions,
}

impl<T: GreetTransport> GreetClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_options(transport, CallOptions::default())
    }

    pub fn with_options(transport: T, options: CallOptions) -> Self {
        Self { transport, options }
    }

    /// Unary call: no request payload, one response.
    pub async fn say_hello(&self) -> Result<HelloResponse, CallError> {
        let (tx, mut rx) = self.transport.open(Method::SayHello).await?;
        tx.close_send().await?;
        let res = self.recv_one(&mut rx).await?;
        info!(message = %res.message, "unary call finished");
        Ok(res)
    }

    /// Server-streaming call: all names go out up front, responses are
    /// drained into `sink` until the peer ends its stream.
    pub async fn say_hello_server_streaming<S>(
        &self,
        requests: Vec<HelloRequest>,
        sink: S,
    ) -> Result<(), CallError>
    where
        S: ResponseSink,
    {
        let (tx, rx) = self
            .transport
            .open(Method::SayHelloServerStreaming)
            .await?;
        // A strict subset of the duplex call: no pacing, requests first.
        let options = CallOptions {
            pacing: Pacing::None,
            ..self.options
        };
        let outcome = run_duplex(tx, rx, requests, sink, options).await;
        if let Some(err) = outcome.sender_error {
            return Err(err.into());
        }
        if let Some(err) = outcome.receiver_error {
            return Err(err.into());
        }
        Ok(())
    }

    /// Client-streaming call: send every name (paced), half-close, then
    /// read the single summary response.
    pub async fn say_hello_client_streaming(
        &self,
        requests: Vec<HelloRequest>,
    ) -> Result<HelloResponse, CallError> {
        info!("client streaming started");
        let (tx, mut rx) = self
            .transport
            .open(Method::SayHelloClientStreaming)
            .await?;
        sender_loop(tx, requests, self.options.pacing).await?;
        let res = self.recv_one(&mut rx).await?;
        info!(message = %res.message, "client streaming finished");
        Ok(res)
    }

    /// Bidirectional call: see [`run_duplex`]. Failing to open the
    /// stream is terminal; nothing has been sent at that point.
    pub async fn say_hello_bidi_streaming<S>(
        &self,
        requests: Vec<HelloRequest>,
        sink: S,
    ) -> Result<DuplexOutcome, TransportError>
    where
        S: ResponseSink,
    {
        let (tx, rx) = self.transport.open(Method::SayHelloBidiStreaming).await?;
        Ok(run_duplex(tx, rx, requests, sink, self.options).await)
    }

    async fn recv_one<Rx: RecvHalf>(&self, rx: &mut Rx) -> Result<HelloResponse, CallError> {
        let received = match self.options.recv_timeout {
            None => rx.recv().await?,
            Some(limit) => tokio::time::timeout(limit, rx.recv())
                .await
                .map_err(|_| CallError::Timeout(limit))??,
        };
        received.ok_or(CallError::MissingResponse)
    }
}
