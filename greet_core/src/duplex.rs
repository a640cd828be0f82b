//! Bidirectional streaming coordination.
//!
//! One call runs exactly two units of control: the sender loop on the
//! calling task and the receiver loop on a spawned task. The only
//! shared resource is the open stream, and its two halves are owned by
//! one task each, so neither direction ever contends with the other.
//! The receiver fires a one-shot completion signal when the peer ends
//! its stream (or errors); the orchestrator waits on that signal after
//! the sender loop returns, so the call settles only once both
//! directions have.

use tracing::{debug, info, warn};

use crate::completion::{completion_pair, CompletionSignal};
use crate::error::{ReceiverError, SenderError};
use crate::{CallOptions, HelloRequest, RecvHalf, ResponseSink, SendHalf};

/// Combined result of one duplex call. The two directions fail
/// independently; a send failure does not suppress a receive error and
/// vice versa.
#[derive(Debug, Default)]
pub struct DuplexOutcome {
    pub sender_error: Option<SenderError>,
    pub receiver_error: Option<ReceiverError>,
}

impl DuplexOutcome {
    pub fn is_ok(&self) -> bool {
        self.sender_error.is_none() && self.receiver_error.is_none()
    }
}

/// Run one bidirectional call over an already-open stream.
///
/// Sends every request in source order (paced per
/// [`CallOptions::pacing`]), half-closes the send direction, and
/// concurrently drains responses into `sink` until the peer ends its
/// stream. Returns once both directions are settled; no response the
/// transport yielded is dropped.
///
/// If the peer never half-closes and `options.recv_timeout` is `None`,
/// this call blocks indefinitely. Supply a timeout to turn that into
/// [`ReceiverError::Timeout`].
pub async fn run_duplex<Tx, Rx, I, S>(
    tx: Tx,
    rx: Rx,
    requests: I,
    sink: S,
    options: CallOptions,
) -> DuplexOutcome
where
    Tx: SendHalf,
    Rx: RecvHalf + 'static,
    I: IntoIterator<Item = HelloRequest>,
    S: ResponseSink,
{
    info!("bidirectional streaming started");

    let (signal, wait) = completion_pair();
    let receiver = tokio::spawn(receiver_task(rx, sink, signal));

    let sender_error = sender_loop(tx, requests, options.pacing).await.err();
    if let Some(err) = &sender_error {
        // The receive direction may still be draining what the peer
        // already sent; keep waiting for it before reporting.
        warn!("send direction failed: {err}");
    }

    let receiver_error = wait.wait_with_timeout(options.recv_timeout).await.err();
    if let Some(err) = &receiver_error {
        warn!("receive direction failed: {err}");
        if matches!(err, ReceiverError::Timeout(_)) {
            // The receiver task is still parked in `recv`; don't leak it.
            receiver.abort();
        }
    }

    info!("bidirectional streaming finished");
    DuplexOutcome {
        sender_error,
        receiver_error,
    }
}

/// Send every request in order, then half-close. Aborts on the first
/// failed send without attempting the half-close.
pub(crate) async fn sender_loop<Tx, I>(
    mut tx: Tx,
    requests: I,
    pacing: crate::Pacing,
) -> Result<(), SenderError>
where
    Tx: SendHalf,
    I: IntoIterator<Item = HelloRequest>,
{
    for (index, req) in requests.into_iter().enumerate() {
        if index > 0 {
            pacing.pause().await;
        }
        debug!(index, name = %req.name, "sending request");
        tx.send(req)
            .await
            .map_err(|source| SenderError::Send { index, source })?;
    }
    debug!("closing send direction");
    tx.close_send()
        .await
        .map_err(|source| SenderError::CloseSend { source })
}

/// Receiver loop wrapper: drains the stream into the sink and fires the
/// completion signal exactly once on the way out.
async fn receiver_task<Rx, S>(mut rx: Rx, mut sink: S, signal: CompletionSignal)
where
    Rx: RecvHalf,
    S: ResponseSink,
{
    let result = receiver_loop(&mut rx, &mut sink).await;
    signal.fire(result);
}

async fn receiver_loop<Rx, S>(rx: &mut Rx, sink: &mut S) -> Result<(), ReceiverError>
where
    Rx: RecvHalf,
    S: ResponseSink,
{
    loop {
        match rx.recv().await {
            Ok(Some(res)) => {
                debug!(message = %res.message, "received response");
                sink.deliver(res);
            }
            Ok(None) => {
                debug!("peer ended its stream");
                return Ok(());
            }
            Err(err) => return Err(ReceiverError::Transport(err)),
        }
    }
}
