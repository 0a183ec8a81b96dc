//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use frpc_gateway::config::{EndpointConfig, GatewayConfig};
use frpc_gateway::{GatewayServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A canned upstream reply.
pub struct MockReply {
    pub status: u16,
    pub reason: &'static str,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
}

impl MockReply {
    pub fn frpc(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            reason: "OK",
            content_type: Some("application/x-frpc"),
            body: body.into(),
        }
    }
}

/// A request as seen by the mock upstream.
pub struct Captured {
    pub head: String,
    pub body: Vec<u8>,
}

/// Start a programmable mock upstream on an ephemeral port.
///
/// The handler sees each request body and picks the reply.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(Captured) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MockReply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let Some(captured) = read_request(&mut socket).await else {
                    return;
                };
                let reply = f(captured).await;

                let mut head = format!("HTTP/1.1 {} {}\r\n", reply.status, reply.reason);
                if let Some(content_type) = reply.content_type {
                    head.push_str(&format!("Content-Type: {}\r\n", content_type));
                }
                head.push_str(&format!(
                    "Content-Length: {}\r\nConnection: close\r\n\r\n",
                    reply.body.len()
                ));

                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&reply.body).await;
                let _ = socket.shutdown().await;
                tokio::time::sleep(Duration::from_millis(10)).await;
            });
        }
    });

    addr
}

/// Start a mock upstream that always returns the same reply.
pub async fn start_mock_backend(
    status: u16,
    reason: &'static str,
    content_type: Option<&'static str>,
    body: &'static [u8],
) -> SocketAddr {
    start_programmable_backend(move |_| async move {
        MockReply {
            status,
            reason,
            content_type,
            body: body.to_vec(),
        }
    })
    .await
}

/// Start a mock upstream that accepts connections and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// An address with nothing listening on it.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn read_request(socket: &mut TcpStream) -> Option<Captured> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(Captured {
        head,
        body: buf[head_end..head_end + content_length].to_vec(),
    })
}

/// Gateway config with a single endpoint `name` pointing at `upstream`.
pub fn gateway_config(name: &str, upstream: SocketAddr, method: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.endpoints.insert(
        name.to_string(),
        EndpointConfig {
            hostname: upstream.ip().to_string(),
            port: upstream.port(),
            path: "/RPC2".to_string(),
            method_name: method.to_string(),
        },
    );
    config
}

/// Run a gateway in the background; returns its address and shutdown handle.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = GatewayServer::new(config);

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// POST a JSON body to `/frpcproxy/<endpoint>`.
pub async fn post_json(addr: SocketAddr, endpoint: &str, body: &str) -> reqwest::Response {
    client()
        .post(format!("http://{}/frpcproxy/{}", addr, endpoint))
        .header("content-type", "application/json")
        .header("accept", "application/json")
        .body(body.to_string())
        .send()
        .await
        .expect("gateway unreachable")
}
