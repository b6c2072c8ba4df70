//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chain_gateway::blockchain::{BlockchainError, BlockchainResult, NodeClient, NodeConnector};
use chain_gateway::config::{ChainConfig, HealthCheckConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// How a fake node behaves right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// Answers with this height.
    Up(u64),
    /// Dials succeed, queries fail.
    Down,
    /// Dials fail.
    Unreachable,
    /// Queries never return.
    Hang,
    /// Answers with the height after a delay.
    Slow(Duration, u64),
    /// Queries panic inside the client.
    Panic,
}

/// In-memory stand-in for a set of RPC nodes, keyed by address.
///
/// Behaviour is looked up on every call, so flipping a node affects clients
/// that were dialed earlier.
#[derive(Debug, Default)]
pub struct FakeNetwork {
    nodes: Mutex<HashMap<String, Node>>,
    dials: AtomicUsize,
    queries: AtomicUsize,
}

impl FakeNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, address: &str, node: Node) {
        self.nodes.lock().unwrap().insert(address.to_string(), node);
    }

    pub fn dials(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn node(&self, address: &str) -> Node {
        self.nodes
            .lock()
            .unwrap()
            .get(address)
            .copied()
            .unwrap_or(Node::Unreachable)
    }

    pub fn connector(self: &Arc<Self>) -> Arc<dyn NodeConnector> {
        Arc::new(FakeConnector(self.clone()))
    }
}

struct FakeConnector(Arc<FakeNetwork>);

#[async_trait]
impl NodeConnector for FakeConnector {
    async fn connect(&self, address: &str) -> BlockchainResult<Arc<dyn NodeClient>> {
        self.0.dials.fetch_add(1, Ordering::SeqCst);
        match self.0.node(address) {
            Node::Unreachable => Err(BlockchainError::Connect {
                address: address.to_string(),
                reason: "connection refused".into(),
            }),
            _ => Ok(Arc::new(FakeClient {
                address: address.to_string(),
                network: self.0.clone(),
            })),
        }
    }
}

#[derive(Debug)]
struct FakeClient {
    address: String,
    network: Arc<FakeNetwork>,
}

#[async_trait]
impl NodeClient for FakeClient {
    fn endpoint(&self) -> &str {
        &self.address
    }

    async fn block_number(&self) -> BlockchainResult<u64> {
        self.network.queries.fetch_add(1, Ordering::SeqCst);
        match self.network.node(&self.address) {
            Node::Up(height) => Ok(height),
            Node::Slow(delay, height) => {
                tokio::time::sleep(delay).await;
                Ok(height)
            }
            Node::Hang => std::future::pending().await,
            Node::Panic => panic!("fake node crashed: {}", self.address),
            Node::Down | Node::Unreachable => Err(BlockchainError::Rpc("connection reset".into())),
        }
    }
}

pub fn chain(chain_id: u64, rpc_url: &str) -> ChainConfig {
    ChainConfig {
        chain_id,
        chain_name: format!("chain-{}", chain_id),
        rpc_url: rpc_url.to_string(),
    }
}

pub fn health_config() -> HealthCheckConfig {
    HealthCheckConfig::default()
}

/// Start a programmable HTTP backend on an ephemeral port.
///
/// The closure receives the request line (e.g. `PUT /v1/agent/service/register HTTP/1.1`)
/// and returns status and body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let request_line = match read_request(&mut socket).await {
                            Some(line) => line,
                            None => return,
                        };
                        let (status, body) = f(request_line).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read headers plus `Content-Length` bytes of body; return the request line.
async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    head.lines().next().map(str::to_string)
}
