use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;

use parley_core::error::{ParleyError, Result};
use parley_core::ConnectionId;

use crate::realtime::core::fanout::DeliverySink;
use crate::realtime::types::PreparedMsg;

/// Transport side of the relay: `connection_id -> outbound queue`.
///
/// Holds no roster state; a queue exists from socket accept until the
/// session loop exits.
#[derive(Default)]
pub struct ConnectionTable {
    queues: DashMap<ConnectionId, mpsc::Sender<Message>>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self {
            queues: DashMap::new(),
        }
    }

    pub fn attach(&self, conn: ConnectionId, tx: mpsc::Sender<Message>) {
        self.queues.insert(conn, tx);
    }

    pub fn detach(&self, conn: &ConnectionId) {
        self.queues.remove(conn);
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}

#[async_trait]
impl DeliverySink for ConnectionTable {
    async fn send(&self, conn: &ConnectionId, msg: &PreparedMsg) -> Result<()> {
        // clone the sender so no map guard is held across the await
        let tx = self
            .queues
            .get(conn)
            .map(|r| r.value().clone())
            .ok_or_else(|| ParleyError::DeliveryFailure {
                conn: conn.clone(),
                reason: "no outbound queue".into(),
            })?;

        tx.send(msg.to_ws_message())
            .await
            .map_err(|_| ParleyError::DeliveryFailure {
                conn: conn.clone(),
                reason: "outbound queue closed".into(),
            })
    }
}
