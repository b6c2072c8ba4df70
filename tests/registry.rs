//! Consul registration against a mock agent.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use chain_gateway::config::RegistryConfig;
use chain_gateway::registry::{ConsulRegistrar, RegistryError, ServiceRegistration};

mod common;

fn registry_config(addr: std::net::SocketAddr) -> RegistryConfig {
    RegistryConfig {
        enabled: true,
        address: format!("http://{}", addr),
        max_attempts: 3,
        base_delay_ms: 10,
        max_delay_ms: 20,
        ..RegistryConfig::default()
    }
}

#[tokio::test]
async fn test_register_retries_until_agent_accepts() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let addr = common::start_programmable_backend(move |_| {
        let cc = cc.clone();
        async move {
            if cc.fetch_add(1, Ordering::SeqCst) < 2 {
                (503, "agent starting".into())
            } else {
                (200, String::new())
            }
        }
    })
    .await;

    let registrar = ConsulRegistrar::new(registry_config(addr), Some("10.1.2.3".into())).unwrap();
    let service = ServiceRegistration::new("chain-gateway", 8000);
    registrar.register(&service).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_register_gives_up_after_max_attempts() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let addr = common::start_programmable_backend(move |_| {
        cc.fetch_add(1, Ordering::SeqCst);
        async { (500, "boom".into()) }
    })
    .await;

    let registrar = ConsulRegistrar::new(registry_config(addr), Some("10.1.2.3".into())).unwrap();
    let err = registrar
        .register(&ServiceRegistration::new("chain-gateway", 8000))
        .await
        .unwrap_err();

    match err {
        RegistryError::Exhausted { attempts, last } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last, RegistryError::Status { status: 500, .. }));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_deregister_targets_service_id() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let addr = common::start_programmable_backend(move |line| {
        log.lock().unwrap().push(line);
        async { (200, String::new()) }
    })
    .await;

    let registrar = ConsulRegistrar::new(registry_config(addr), Some("10.1.2.3".into())).unwrap();
    let service = ServiceRegistration::new("chain-gateway", 8000);
    registrar.register(&service).await.unwrap();
    registrar.deregister(&service.id).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].starts_with("PUT /v1/agent/service/register "));
    assert!(seen[1].starts_with("PUT /v1/agent/service/deregister/chain-gateway-8000 "));
}
