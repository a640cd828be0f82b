//! Hand-rolled test doubles for the transport seam: a send half that
//! records everything and can fail at a scripted index, a receive half
//! that plays back a scripted stream, and a transport serving one
//! scripted stream per call.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::TransportError;
use crate::{GreetTransport, HelloRequest, HelloResponse, Method, RecvHalf, SendHalf};

pub fn responses(messages: &[&str]) -> Vec<HelloResponse> {
    messages
        .iter()
        .map(|m| HelloResponse {
            message: m.to_string(),
        })
        .collect()
}

/// Recording send half. Clones share the counters, so a test can keep a
/// handle while the call consumes the original on `close_send`.
#[derive(Clone)]
pub struct ScriptedTx {
    sent: Arc<Mutex<Vec<HelloRequest>>>,
    attempts: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    fail_at: Option<usize>,
    fail_msg: String,
}

impl ScriptedTx {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            attempts: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
            fail_at: None,
            fail_msg: String::new(),
        }
    }

    /// Fail the send at `index` (0-based) with the given message.
    pub fn failing_at(index: usize, msg: &str) -> Self {
        Self {
            fail_at: Some(index),
            fail_msg: msg.to_string(),
            ..Self::new()
        }
    }

    /// Number of `send` calls attempted, including the failed one.
    pub fn send_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Names successfully sent, in order.
    pub fn sent_names(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }
}

#[async_trait]
impl SendHalf for ScriptedTx {
    async fn send(&mut self, req: HelloRequest) -> Result<(), TransportError> {
        let index = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == Some(index) {
            return Err(TransportError::Other(self.fail_msg.clone()));
        }
        self.sent.lock().unwrap().push(req);
        Ok(())
    }

    async fn close_send(self) -> Result<(), TransportError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Playback receive half: yields scripted responses, then either ends
/// the stream, fails, or never resolves again (silent peer).
pub struct ScriptedRx {
    items: VecDeque<HelloResponse>,
    tail: Tail,
}

enum Tail {
    End,
    Error(Option<TransportError>),
    Silent,
}

impl ScriptedRx {
    /// Yield `items`, then clean end-of-stream.
    pub fn ending_after(items: Vec<HelloResponse>) -> Self {
        Self {
            items: items.into(),
            tail: Tail::End,
        }
    }

    /// Yield `items`, then the given transport error.
    pub fn failing_after(items: Vec<HelloResponse>, err: TransportError) -> Self {
        Self {
            items: items.into(),
            tail: Tail::Error(Some(err)),
        }
    }

    /// Yield `items`, then block forever: a peer that never half-closes.
    pub fn never_ending(items: Vec<HelloResponse>) -> Self {
        Self {
            items: items.into(),
            tail: Tail::Silent,
        }
    }
}

#[async_trait]
impl RecvHalf for ScriptedRx {
    async fn recv(&mut self) -> Result<Option<HelloResponse>, TransportError> {
        if let Some(res) = self.items.pop_front() {
            return Ok(Some(res));
        }
        match &mut self.tail {
            Tail::End => Ok(None),
            Tail::Error(err) => Err(err
                .take()
                .unwrap_or_else(|| TransportError::ConnectionClosed)),
            Tail::Silent => std::future::pending().await,
        }
    }
}

/// Transport whose streams are scripted per call. Each `open` pops the
/// next scripted pair; opening more streams than scripted fails.
pub struct ScriptedTransport {
    streams: Mutex<VecDeque<(ScriptedTx, ScriptedRx)>>,
    opened: Mutex<Vec<Method>>,
}

impl ScriptedTransport {
    pub fn single(tx: ScriptedTx, rx: ScriptedRx) -> Self {
        Self {
            streams: Mutex::new(VecDeque::from([(tx, rx)])),
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Methods passed to `open`, in order.
    pub fn opened_methods(&self) -> Vec<Method> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl GreetTransport for ScriptedTransport {
    type Tx = ScriptedTx;
    type Rx = ScriptedRx;

    async fn open(&self, method: Method) -> Result<(Self::Tx, Self::Rx), TransportError> {
        self.opened.lock().unwrap().push(method);
        self.streams
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Other("no scripted stream left".to_string()))
    }
}
