use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use tokio::time::{timeout, Duration};

use parley_core::error::{ParleyError, Result};
use parley_core::{ConnectionId, Delivery, Target};

use crate::realtime::core::SessionRegistry;
use crate::realtime::types::PreparedMsg;

/// Capability to push one prepared payload to one connection.
///
/// Implementations must not block other sends and report failure through the
/// returned error instead of panicking.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn send(&self, conn: &ConnectionId, msg: &PreparedMsg) -> Result<()>;
}

/// Outcome of executing the deliveries of one event.
#[derive(Debug, Default)]
pub struct FanoutReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failures: Vec<ParleyError>,
}

impl FanoutReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Executes router output: one task per recipient, join all, collect errors.
pub struct Fanout {
    registry: Arc<SessionRegistry>,
    sink: Arc<dyn DeliverySink>,
    send_timeout: Option<Duration>,
}

impl Fanout {
    /// `send_timeout_ms == 0` disables the per-recipient timeout.
    pub fn new(
        registry: Arc<SessionRegistry>,
        sink: Arc<dyn DeliverySink>,
        send_timeout_ms: u64,
    ) -> Self {
        Self {
            registry,
            sink,
            send_timeout: (send_timeout_ms > 0).then(|| Duration::from_millis(send_timeout_ms)),
        }
    }

    /// Deliveries run in order; recipients within one delivery run concurrently.
    pub async fn deliver(&self, deliveries: Vec<Delivery>) -> FanoutReport {
        let mut report = FanoutReport::default();
        for d in deliveries {
            self.deliver_one(d, &mut report).await;
        }
        report
    }

    async fn deliver_one(&self, delivery: Delivery, report: &mut FanoutReport) {
        let prepared = match PreparedMsg::prepare(&delivery.payload) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "payload encode failed");
                report.failures.push(e);
                return;
            }
        };

        // `All` is resolved now, after the router has mutated the registry.
        let recipients = match delivery.target {
            Target::One(conn) => vec![conn],
            Target::All => self.registry.connection_ids(),
        };

        let msg = &prepared;
        let mut futs = FuturesUnordered::new();
        for conn in recipients {
            futs.push(async move {
                let res = self.send_bounded(&conn, msg).await;
                (conn, res)
            });
        }

        while let Some((conn, res)) = futs.next().await {
            report.attempted += 1;
            match res {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(conn = %conn, error = %e, "delivery failed");
                    report.failures.push(e);
                }
            }
        }
    }

    async fn send_bounded(&self, conn: &ConnectionId, msg: &PreparedMsg) -> Result<()> {
        let Some(limit) = self.send_timeout else {
            return self.sink.send(conn, msg).await;
        };
        timeout(limit, self.sink.send(conn, msg))
            .await
            .map_err(|_| ParleyError::DeliveryFailure {
                conn: conn.clone(),
                reason: "send timed out".into(),
            })?
    }
}
