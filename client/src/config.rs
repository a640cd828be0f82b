// Configuration for the demo client, read from the environment.

use std::time::Duration;

use greet_core::{CallOptions, Pacing};

/// Which call shape to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    Unary,
    ServerStreaming,
    ClientStreaming,
    BidiStreaming,
}

impl CallShape {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "unary" | "say_hello" => Some(CallShape::Unary),
            "server_streaming" | "server_stream" => Some(CallShape::ServerStreaming),
            "client_streaming" | "client_stream" => Some(CallShape::ClientStreaming),
            "bidi" | "bidi_streaming" => Some(CallShape::BidiStreaming),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct ClientConfig {
    pub server_addr: String,
    pub call: CallShape,
    pub names: Vec<String>,
    pub send_interval_ms: u64,
    pub recv_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:8080".to_string(),
            call: CallShape::BidiStreaming,
            names: vec!["Aman".to_string(), "Aryan".to_string(), "Satvik".to_string()],
            send_interval_ms: 2000,
            recv_timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let server_addr = std::env::var("SERVER_ADDR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.server_addr);

        let call = std::env::var("CALL")
            .ok()
            .and_then(|v| CallShape::parse(&v))
            .unwrap_or(defaults.call);

        let names = std::env::var("NAMES")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .filter(|v: &Vec<String>| !v.is_empty())
            .unwrap_or(defaults.names);

        let send_interval_ms = std::env::var("SEND_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.send_interval_ms);

        let recv_timeout_secs = std::env::var("RECV_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.recv_timeout_secs);

        Self {
            server_addr,
            call,
            names,
            send_interval_ms,
            recv_timeout_secs,
        }
    }

    /// Call options derived from the config. Zero disables the knob.
    pub fn call_options(&self) -> CallOptions {
        CallOptions {
            pacing: if self.send_interval_ms == 0 {
                Pacing::None
            } else {
                Pacing::Fixed(Duration::from_millis(self.send_interval_ms))
            },
            recv_timeout: if self.recv_timeout_secs == 0 {
                None
            } else {
                Some(Duration::from_secs(self.recv_timeout_secs))
            },
        }
    }
}
