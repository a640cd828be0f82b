//! Concrete transports behind the `greet_core` stream seam.
//!
//! The wire protocol is deliberately small: one TCP connection per
//! call. The client writes a JSON header line naming the method, then
//! zero or more `HelloRequest` lines, then half-closes its write
//! direction (TCP FIN) to signal it is done sending. The server writes
//! zero or more `HelloResponse` lines and closes. Frames are
//! newline-delimited `serde_json`.

pub mod mem;
pub mod tcp;
pub mod wire;

pub use tcp::TcpTransport;
