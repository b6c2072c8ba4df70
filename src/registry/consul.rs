//! Consul agent registration over its HTTP API.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::config::RegistryConfig;
use crate::resilience::Backoff;

/// Errors from talking to the Consul agent.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("registry returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("registration failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<RegistryError>,
    },
}

/// What to register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRegistration {
    pub name: String,
    pub id: String,
    pub port: u16,
}

impl ServiceRegistration {
    /// Registration for `name`, identified as `{name}-{port}`.
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        let name = name.into();
        Self {
            id: format!("{}-{}", name, port),
            name,
            port,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AgentServiceRegistration<'a> {
    name: &'a str,
    #[serde(rename = "ID")]
    id: &'a str,
    port: u16,
    tags: &'a [String],
    address: &'a str,
    check: AgentServiceCheck,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AgentServiceCheck {
    #[serde(rename = "HTTP")]
    http: String,
    method: &'static str,
    timeout: String,
    interval: String,
    deregister_critical_service_after: String,
}

/// Registers this process with a Consul agent.
pub struct ConsulRegistrar {
    client: reqwest::Client,
    config: RegistryConfig,
    advertise_ip: String,
}

impl ConsulRegistrar {
    /// `register_ip` overrides outbound-IP detection.
    pub fn new(config: RegistryConfig, register_ip: Option<String>) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        let advertise_ip = match register_ip.filter(|ip| !ip.trim().is_empty()) {
            Some(ip) => {
                tracing::info!(ip = %ip, "Using configured register IP");
                ip
            }
            None => {
                let ip = detect_outbound_ip().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
                tracing::info!(ip = %ip, "Detected register IP");
                ip.to_string()
            }
        };

        Ok(Self {
            client,
            config,
            advertise_ip,
        })
    }

    pub fn advertise_ip(&self) -> &str {
        &self.advertise_ip
    }

    /// Register the service, retrying with backoff up to `max_attempts` times.
    pub async fn register(&self, service: &ServiceRegistration) -> Result<(), RegistryError> {
        let payload = AgentServiceRegistration {
            name: &service.name,
            id: &service.id,
            port: service.port,
            tags: &self.config.tags,
            address: &self.advertise_ip,
            check: AgentServiceCheck {
                http: format!("http://{}:{}/health", self.advertise_ip, service.port),
                method: "GET",
                timeout: format!("{}s", self.config.check_timeout_secs),
                interval: format!("{}s", self.config.check_interval_secs),
                deregister_critical_service_after: format!("{}s", self.config.deregister_after_secs),
            },
        };
        let url = format!("{}/v1/agent/service/register", self.base_url());
        let backoff = Backoff::from_millis(self.config.base_delay_ms, self.config.max_delay_ms);
        let attempts = self.config.max_attempts.max(1);

        let mut last = None;
        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = backoff.delay(attempt - 1);
                tracing::warn!(attempt, max_attempts = attempts, delay = ?delay, "Retrying service registration");
                tokio::time::sleep(delay).await;
            }

            match self.put(&url, Some(&payload)).await {
                Ok(()) => {
                    tracing::info!(service_id = %service.id, address = %self.advertise_ip, "Service registered");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Service registration failed");
                    last = Some(e);
                }
            }
        }

        Err(RegistryError::Exhausted {
            attempts,
            last: Box::new(last.unwrap_or(RegistryError::Status {
                status: 0,
                body: "no attempt made".to_string(),
            })),
        })
    }

    /// Remove the service from the agent. Single attempt.
    pub async fn deregister(&self, service_id: &str) -> Result<(), RegistryError> {
        let url = format!("{}/v1/agent/service/deregister/{}", self.base_url(), service_id);
        self.put::<()>(&url, None).await?;
        tracing::info!(service_id = %service_id, "Service deregistered");
        Ok(())
    }

    async fn put<T: Serialize>(&self, url: &str, body: Option<&T>) -> Result<(), RegistryError> {
        let mut request = self.client.put(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(RegistryError::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn base_url(&self) -> &str {
        self.config.address.trim_end_matches('/')
    }
}

/// Local IP used for outbound traffic. No packet is sent.
pub fn detect_outbound_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}
