//! Shared application state for the parley gateway.
//!
//! One registry instance is created here and injected into the relay; there is
//! no ambient global roster.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parley_core::ConnectionId;

use crate::config::GatewayConfig;
use crate::dispatch::Relay;
use crate::obs::RelayMetrics;
use crate::realtime::{ConnectionTable, DeliverySink, SessionRegistry};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    connections: Arc<ConnectionTable>,
    relay: Arc<Relay>,
    metrics: Arc<RelayMetrics>,
    next_conn: AtomicU64,
}

impl AppState {
    pub fn new(cfg: GatewayConfig) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let connections = Arc::new(ConnectionTable::new());
        let metrics = Arc::new(RelayMetrics::default());

        let sink: Arc<dyn DeliverySink> = connections.clone();
        let relay = Arc::new(Relay::new(
            registry,
            sink,
            cfg.relay.send_timeout_ms,
            Arc::clone(&metrics),
        ));

        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                connections,
                relay,
                metrics,
                next_conn: AtomicU64::new(1),
            }),
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    /// Fresh id for an accepted socket; never reused in this process.
    pub fn next_connection_id(&self) -> ConnectionId {
        let n = self.inner.next_conn.fetch_add(1, Ordering::Relaxed);
        ConnectionId::from(format!("conn-{n}"))
    }

    pub fn connections(&self) -> &ConnectionTable {
        &self.inner.connections
    }

    pub fn relay(&self) -> Arc<Relay> {
        Arc::clone(&self.inner.relay)
    }

    pub fn metrics(&self) -> &RelayMetrics {
        &self.inner.metrics
    }
}
