use std::sync::Arc;
use std::time::Instant;

use parley_core::protocol::text::decode_event;
use parley_core::{ConnectionId, Delivery, RoutedEvent};

use crate::dispatch::EventRouter;
use crate::obs::RelayMetrics;
use crate::realtime::{DeliverySink, Fanout, FanoutReport, SessionRegistry};

/// Router plus fan-out: the full handling of one inbound event.
///
/// Cheap to share behind `Arc`; events for different connections may be
/// handled concurrently.
pub struct Relay {
    router: EventRouter,
    fanout: Fanout,
    metrics: Arc<RelayMetrics>,
}

impl Relay {
    pub fn new(
        registry: Arc<SessionRegistry>,
        sink: Arc<dyn DeliverySink>,
        send_timeout_ms: u64,
        metrics: Arc<RelayMetrics>,
    ) -> Self {
        Self {
            router: EventRouter::new(Arc::clone(&registry)),
            fanout: Fanout::new(registry, sink, send_timeout_ms),
            metrics,
        }
    }

    /// Route a lifecycle or decoded event and wait for every send to settle.
    pub async fn handle(&self, conn: &ConnectionId, event: RoutedEvent) -> FanoutReport {
        self.metrics.events.inc(&[("kind", event.kind())]);
        let started = Instant::now();
        let deliveries = self.router.route(conn, event);
        let report = self.execute(conn, deliveries).await;
        self.metrics.event_duration.observe(started.elapsed());
        report
    }

    /// Decode-and-route for a client text frame. Malformed frames are logged,
    /// counted and otherwise ignored.
    pub async fn handle_text(&self, conn: &ConnectionId, text: &str) -> FanoutReport {
        match decode_event(text) {
            Ok(event) => self.handle(conn, event).await,
            Err(e) => {
                self.metrics.dropped_frames.inc(&[("reason", e.kind())]);
                tracing::warn!(conn = %conn, error = %e, "dropping malformed frame");
                FanoutReport::default()
            }
        }
    }

    async fn execute(&self, conn: &ConnectionId, deliveries: Vec<Delivery>) -> FanoutReport {
        if deliveries.is_empty() {
            return FanoutReport::default();
        }
        let report = self.fanout.deliver(deliveries).await;

        self.metrics
            .deliveries
            .add(&[("result", "ok")], report.delivered as u64);
        self.metrics
            .deliveries
            .add(&[("result", "failed")], report.failures.len() as u64);

        if !report.is_clean() {
            tracing::warn!(
                conn = %conn,
                attempted = report.attempted,
                failed = report.failures.len(),
                "event handled with delivery failures"
            );
        }
        report
    }
}
