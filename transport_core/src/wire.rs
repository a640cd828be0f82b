//! Line-frame encoding shared by the client transport and the server.

use greet_core::error::TransportError;
use greet_core::Method;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// First line of every call: which RPC this connection carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallHeader {
    pub call: Method,
}

/// Encode one value as a newline-terminated JSON frame.
pub fn encode_line<T: Serialize>(value: &T) -> Result<String, TransportError> {
    let mut line = serde_json::to_string(value)
        .map_err(|e| TransportError::Other(format!("frame encoding failed: {e}")))?;
    line.push('\n');
    Ok(line)
}

/// Decode one received line. A line that is not valid JSON for `T` is
/// a protocol violation, not an I/O failure.
pub fn decode_line<T: DeserializeOwned>(line: &str) -> Result<T, TransportError> {
    serde_json::from_str(line).map_err(|e| TransportError::InvalidFrame(e.to_string()))
}
