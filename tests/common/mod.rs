//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use stream_gateway::{GatewayConfig, HttpServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// Serve `router` as a mock upstream on an ephemeral port.
pub async fn start_upstream(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Start a gateway pointed at `upstream`.
pub async fn start_gateway(upstream: SocketAddr) -> (SocketAddr, Shutdown) {
    start_gateway_with_config(gateway_config(upstream)).await
}

/// Test defaults: upstream at `upstream`, short connect timeout.
pub fn gateway_config(upstream: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream.base_url = format!("http://{}", upstream);
    config.timeouts.connect_secs = 2;
    config
}

/// Start a gateway with an explicit configuration on an ephemeral port.
pub async fn start_gateway_with_config(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Read one HTTP/1.1 request (headers plus Content-Length body).
async fn read_request(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= header_end + 4 + content_length {
            return;
        }
    }
}

const SSE_HEAD: &str =
    "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nTransfer-Encoding: chunked\r\n\r\n";

fn chunk_frame(data: &str) -> String {
    format!("{:x}\r\n{}\r\n", data.len(), data)
}

/// Upstream that writes each chunk as its own chunked-encoding frame,
/// sleeping `delay` between them.
pub async fn start_chunked_backend(chunks: Vec<&'static str>, delay: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let chunks = chunks.clone();
            tokio::spawn(async move {
                read_request(&mut socket).await;
                let _ = socket.write_all(SSE_HEAD.as_bytes()).await;
                for (i, data) in chunks.iter().enumerate() {
                    if i > 0 {
                        tokio::time::sleep(delay).await;
                    }
                    let _ = socket.write_all(chunk_frame(data).as_bytes()).await;
                    let _ = socket.flush().await;
                }
                let _ = socket.write_all(b"0\r\n\r\n").await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Upstream that sends one chunk and then drops the connection without
/// terminating the chunked body.
pub async fn start_truncating_backend(first: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_request(&mut socket).await;
                let _ = socket.write_all(SSE_HEAD.as_bytes()).await;
                let _ = socket.write_all(chunk_frame(first).as_bytes()).await;
                tokio::time::sleep(Duration::from_millis(50)).await;
                drop(socket);
            });
        }
    });

    addr
}

/// Upstream that streams forever until a write fails, then reports how
/// many chunks it managed to write.
pub async fn start_endless_backend(interval: Duration) -> (SocketAddr, oneshot::Receiver<u64>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (done_tx, done_rx) = oneshot::channel();

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            read_request(&mut socket).await;
            let _ = socket.write_all(SSE_HEAD.as_bytes()).await;
            let mut written = 0u64;
            loop {
                let frame = chunk_frame(&format!("data: tick {}\n\n", written));
                if socket.write_all(frame.as_bytes()).await.is_err() {
                    break;
                }
                written += 1;
                tokio::time::sleep(interval).await;
            }
            let _ = done_tx.send(written);
        }
    });

    (addr, done_rx)
}

/// Upstream that accepts and reads the request but never answers. Sockets
/// are held open for the life of the test.
pub async fn start_stalled_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((mut socket, _)) = listener.accept().await {
            read_request(&mut socket).await;
            held.push(socket);
        }
    });

    addr
}
