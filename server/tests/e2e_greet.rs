//! End-to-end tests: real client, real server, real TCP.

mod common;

use common::*;

use greet_core::{Collector, HelloRequest};
use tokio::io::AsyncWriteExt;

fn requests(names: &[&str]) -> Vec<HelloRequest> {
    names.iter().map(|n| HelloRequest::new(*n)).collect()
}

#[tokio::test]
async fn test_unary_call() {
    let addr = spawn_server().await;
    let client = test_client(addr);

    let res = client.say_hello().await.unwrap();
    assert_eq!(res.message, "Hello");
}

#[tokio::test]
async fn test_server_streaming_call() {
    let addr = spawn_server().await;
    let client = test_client(addr);
    let collector = Collector::new();

    client
        .say_hello_server_streaming(requests(&["Aman", "Aryan", "Satvik"]), collector.clone())
        .await
        .unwrap();

    let got: Vec<String> = collector.messages().into_iter().map(|m| m.message).collect();
    assert_eq!(got, vec!["Hello Aman", "Hello Aryan", "Hello Satvik"]);
}

#[tokio::test]
async fn test_client_streaming_call() {
    let addr = spawn_server().await;
    let client = test_client(addr);

    let res = client
        .say_hello_client_streaming(requests(&["Aman", "Aryan", "Satvik"]))
        .await
        .unwrap();

    assert_eq!(res.message, "Hello Aman, Aryan, Satvik");
}

#[tokio::test]
async fn test_bidi_streaming_call() {
    let addr = spawn_server().await;
    let client = test_client(addr);
    let collector = Collector::new();

    let outcome = client
        .say_hello_bidi_streaming(requests(&["Aman", "Aryan", "Satvik"]), collector.clone())
        .await
        .unwrap();

    assert!(outcome.is_ok(), "unexpected errors: {outcome:?}");
    let got: Vec<String> = collector.messages().into_iter().map(|m| m.message).collect();
    assert_eq!(got, vec!["Hello Aman", "Hello Aryan", "Hello Satvik"]);
}

#[tokio::test]
async fn test_bidi_streaming_empty_name_list() {
    let addr = spawn_server().await;
    let client = test_client(addr);
    let collector = Collector::new();

    let outcome = client
        .say_hello_bidi_streaming(Vec::new(), collector.clone())
        .await
        .unwrap();

    assert!(outcome.is_ok());
    assert!(collector.messages().is_empty());
}

#[tokio::test]
async fn test_malformed_header_does_not_kill_the_server() {
    let addr = spawn_server().await;

    // Poke the server with garbage; the connection should just die.
    let mut raw = tokio::net::TcpStream::connect(addr).await.unwrap();
    raw.write_all(b"this is not a call header\n").await.unwrap();
    raw.shutdown().await.unwrap();
    drop(raw);

    // The accept loop must still serve real calls afterwards.
    let client = test_client(addr);
    let res = client.say_hello().await.unwrap();
    assert_eq!(res.message, "Hello");
}
