//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve until the shutdown broadcast fires
//!
//! # Routes
//! - `GET /health` liveness for the service registry
//! - `GET /api/v1/web3/block?chain_id=N` current block height

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Query, Request, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::blockchain::{ChainId, NodeManager};
use crate::config::GatewayConfig;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::http::response::{self, ERROR};
use crate::observability::metrics;
use crate::service::ChainService;

/// Chain used when the query names none.
pub const DEFAULT_CHAIN_ID: u64 = 1;

const BLOCK_ROUTE: &str = "/api/v1/web3/block";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub chains: ChainService,
}

/// Payload of a successful block height query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockHeight {
    pub chain_id: u64,
    pub height: u64,
}

#[derive(Debug, Deserialize)]
struct BlockQuery {
    chain_id: Option<String>,
}

/// HTTP server for the gateway API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server on top of an already started node manager.
    pub fn new(config: &GatewayConfig, nodes: Arc<NodeManager>) -> Self {
        let request_timeout = Duration::from_secs(config.server.request_timeout_secs);
        let query_timeout = Duration::from_secs(config.server.query_timeout_secs);
        let state = AppState {
            chains: ChainService::new(nodes, query_timeout),
        };
        Self {
            router: Self::build_router(request_timeout, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(request_timeout: Duration, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request.headers().request_id(),
                )
            }))
            .layer(propagate_request_id_layer())
            .layer(TimeoutLayer::new(request_timeout));

        Router::new()
            .route("/health", get(health))
            .route(BLOCK_ROUTE, get(get_block))
            .with_state(state)
            .layer(middleware)
    }

    /// The configured router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections until shutdown.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "UP" }))
}

/// `GET /api/v1/web3/block?chain_id=N`
async fn get_block(
    State(state): State<AppState>,
    Query(query): Query<BlockQuery>,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let request_id = headers.request_id();

    let chain_id = match parse_chain_id(query.chain_id.as_deref()) {
        Ok(id) => id,
        Err(raw) => {
            tracing::debug!(request_id = %request_id, chain_id = %raw, "Rejected chain_id");
            let response = response::fail(
                StatusCode::BAD_REQUEST,
                ERROR,
                format!("invalid chain_id '{}'", raw),
            );
            metrics::record_request("GET", BLOCK_ROUTE, response.status().as_u16(), start);
            return response;
        }
    };

    let response = match state.chains.current_height(ChainId(chain_id)).await {
        Ok(height) => response::success(BlockHeight { chain_id, height }),
        Err(e) => {
            if e.is_transient() {
                tracing::warn!(request_id = %request_id, chain_id, error = %e, "Block height query failed");
            } else {
                tracing::debug!(request_id = %request_id, chain_id, error = %e, "Block height query rejected");
            }
            e.into_response()
        }
    };
    metrics::record_request("GET", BLOCK_ROUTE, response.status().as_u16(), start);
    response
}

/// Missing, empty or zero selects the default chain. Returns the raw text on error.
fn parse_chain_id(raw: Option<&str>) -> Result<u64, String> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(DEFAULT_CHAIN_ID),
        Some(raw) => raw,
    };
    match raw.parse::<u64>() {
        Ok(0) => Ok(DEFAULT_CHAIN_ID),
        Ok(id) => Ok(id),
        Err(_) => Err(raw.to_string()),
    }
}
