#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::timeout;

use cerebral_api::{app_state::AppState, config::ApiConfig, router, server};

async fn raw_get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let req = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(req.as_bytes()).await.unwrap();

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    String::from_utf8(buf).unwrap()
}

#[tokio::test]
async fn both_listeners_serve_and_stop_on_shutdown() {
    let state = AppState::new(ApiConfig::default()).unwrap();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let api_listener = server::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let api_addr = api_listener.local_addr().unwrap();
    let exporter_listener = server::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let exporter_addr = exporter_listener.local_addr().unwrap();

    let api = tokio::spawn(server::serve(
        api_listener,
        router::build_router(state.clone()),
        shutdown_rx.clone(),
    ));
    let exporter = tokio::spawn(server::serve(
        exporter_listener,
        router::build_exporter_router(state.clone()),
        shutdown_rx,
    ));

    let root = raw_get(api_addr, "/").await;
    assert!(root.starts_with("HTTP/1.1 200 OK"), "{root}");
    assert!(root.contains(r#"{"Hello":"World"}"#), "{root}");

    let scrape = raw_get(exporter_addr, "/").await;
    assert!(scrape.starts_with("HTTP/1.1 200 OK"), "{scrape}");
    assert!(scrape.contains("request_count_total 1\n"), "{scrape}");
    assert_eq!(state.metrics().request_count.get(), 1);

    shutdown_tx.send(true).unwrap();

    let api_result = timeout(Duration::from_secs(5), api).await.expect("api stops");
    assert!(api_result.unwrap().is_ok());
    let exporter_result = timeout(Duration::from_secs(5), exporter).await.expect("exporter stops");
    assert!(exporter_result.unwrap().is_ok());
}

#[tokio::test]
async fn bind_reports_address_in_use() {
    let first = server::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let addr = first.local_addr().unwrap();

    let err = server::bind(addr).await.expect_err("port is taken");
    assert_eq!(err.client_code().as_str(), "INTERNAL");
    assert!(err.to_string().contains(&addr.to_string()), "{err}");
}
