//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Start background tasks (health sweep, metrics)
//! - Bind the listener and begin accepting traffic
//! - Tear everything down in reverse once a signal arrives

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::blockchain::client::redact_address;
use crate::blockchain::{AlloyConnector, NodeManager};
use crate::config::GatewayConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::registry::{ConsulRegistrar, ServiceRegistration};

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server failed: {0}")]
    Server(#[source] std::io::Error),
}

/// Run the gateway until SIGINT/SIGTERM.
pub async fn run(config: GatewayConfig) -> Result<(), StartupError> {
    tracing::info!(
        name = %config.server.name,
        version = %config.server.version,
        chains = config.chains.len(),
        "chain-gateway starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();

    let nodes = NodeManager::start(
        &config.chains,
        &config.health_check,
        Arc::new(AlloyConnector::new()),
        shutdown.subscribe(),
    )
    .await;
    report_chain_status(&nodes);

    let listener = TcpListener::bind(&config.server.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.server.bind_address.clone(),
            source,
        })?;
    let local_addr = listener.local_addr().map_err(StartupError::Server)?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let server = HttpServer::new(&config, nodes.clone());
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let registration = register(&config, local_addr.port()).await;

    tokio::select! {
        _ = signals::wait_for_signal() => {}
        result = &mut server_task => {
            // The server only returns early on an accept-loop failure.
            shutdown.trigger();
            nodes.stopped().await;
            deregister(registration).await;
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(StartupError::Server(e)),
                Err(e) => Err(StartupError::Server(std::io::Error::other(e))),
            };
        }
    }

    shutdown.trigger();
    match server_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "HTTP server exited with error"),
        Err(e) => tracing::error!(error = %e, "HTTP server task failed"),
    }
    nodes.stopped().await;
    deregister(registration).await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Startup self-check: one line per chain saying whether it can serve.
fn report_chain_status(nodes: &NodeManager) {
    for chain_id in nodes.chains() {
        match nodes.get_client(chain_id) {
            Ok(client) => tracing::info!(
                chain_id = %chain_id,
                endpoint = %redact_address(client.endpoint()),
                "Chain ready"
            ),
            Err(e) => tracing::warn!(chain_id = %chain_id, error = %e, "Chain not ready"),
        }
    }
}

async fn register(config: &GatewayConfig, port: u16) -> Option<(ConsulRegistrar, ServiceRegistration)> {
    if !config.registry.enabled {
        tracing::debug!("Service registration disabled");
        return None;
    }

    let registrar = match ConsulRegistrar::new(config.registry.clone(), config.server.register_ip.clone()) {
        Ok(registrar) => registrar,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build registry client");
            return None;
        }
    };
    let service = ServiceRegistration::new(config.server.name.clone(), port);
    if let Err(e) = registrar.register(&service).await {
        tracing::error!(error = %e, "Service registration failed, continuing unregistered");
        return None;
    }
    Some((registrar, service))
}

async fn deregister(registration: Option<(ConsulRegistrar, ServiceRegistration)>) {
    if let Some((registrar, service)) = registration {
        if let Err(e) = registrar.deregister(&service.id).await {
            tracing::warn!(service_id = %service.id, error = %e, "Service deregistration failed");
        }
    }
}
