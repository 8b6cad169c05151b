#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use parley_core::error::{ParleyError, Result};
use parley_core::ConnectionId;
use parley_gateway::dispatch::Relay;
use parley_gateway::obs::RelayMetrics;
use parley_gateway::realtime::{DeliverySink, PreparedMsg, SessionRegistry};

/// Sink that records every send and fails for a chosen set of connections.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<(ConnectionId, String)>>,
    failing: Mutex<HashSet<ConnectionId>>,
    hanging: Mutex<HashSet<ConnectionId>>,
}

impl RecordingSink {
    pub fn fail_for(&self, conn: &ConnectionId) {
        self.failing.lock().unwrap().insert(conn.clone());
    }

    pub fn hang_for(&self, conn: &ConnectionId) {
        self.hanging.lock().unwrap().insert(conn.clone());
    }

    /// Payloads received by `conn`, in order.
    pub fn received(&self, conn: &ConnectionId) -> Vec<Value> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c == conn)
            .map(|(_, s)| serde_json::from_str(s).unwrap())
            .collect()
    }

    pub fn total(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl DeliverySink for RecordingSink {
    async fn send(&self, conn: &ConnectionId, msg: &PreparedMsg) -> Result<()> {
        let hang = self.hanging.lock().unwrap().contains(conn);
        if hang {
            std::future::pending::<()>().await;
        }
        let fail = self.failing.lock().unwrap().contains(conn);
        if fail {
            return Err(ParleyError::DeliveryFailure {
                conn: conn.clone(),
                reason: "peer gone".into(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((conn.clone(), msg.as_str().to_string()));
        Ok(())
    }
}

pub struct Harness {
    pub registry: Arc<SessionRegistry>,
    pub sink: Arc<RecordingSink>,
    pub metrics: Arc<RelayMetrics>,
    pub relay: Relay,
}

pub fn harness() -> Harness {
    harness_with_timeout(0)
}

pub fn harness_with_timeout(send_timeout_ms: u64) -> Harness {
    let registry = Arc::new(SessionRegistry::new());
    let sink = Arc::new(RecordingSink::default());
    let metrics = Arc::new(RelayMetrics::default());
    let dyn_sink: Arc<dyn DeliverySink> = sink.clone();
    let relay = Relay::new(
        Arc::clone(&registry),
        dyn_sink,
        send_timeout_ms,
        Arc::clone(&metrics),
    );
    Harness {
        registry,
        sink,
        metrics,
        relay,
    }
}

pub fn conn(id: &str) -> ConnectionId {
    ConnectionId::from(id)
}
