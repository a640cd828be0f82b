//! Common utilities for the end-to-end tests.

use std::net::SocketAddr;
use std::time::Duration;

use greet_core::calls::GreetClient;
use greet_core::CallOptions;
use server::GreetServer;
use transport_core::TcpTransport;

/// Bind the greet server on an OS-picked port and serve it in the
/// background. Returns the address to dial.
pub async fn spawn_server() -> SocketAddr {
    let server = GreetServer::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test server");
    let addr = server.local_addr().expect("no local addr");
    tokio::spawn(server.serve());
    addr
}

/// Client against `addr` with a generous receive timeout so a broken
/// test fails instead of hanging.
pub fn test_client(addr: SocketAddr) -> GreetClient<TcpTransport> {
    GreetClient::with_options(
        TcpTransport::new(addr.to_string()),
        CallOptions {
            recv_timeout: Some(Duration::from_secs(5)),
            ..CallOptions::default()
        },
    )
}
