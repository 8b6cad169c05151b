//! WebSocket handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS and assign a connection id
//! - Attach the connection's outbound queue, drained by its own writer task
//! - Turn socket lifecycle into `connect`/`disconnect` events
//! - Hand text frames to the relay
//! - Heartbeat ping + idle timeout

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    response::Response,
};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep_until, Duration, Instant, MissedTickBehavior};
use tracing::Instrument;

use parley_core::error::{ParleyError, Result};
use parley_core::{ConnectionId, RoutedEvent};

use crate::app_state::AppState;
use crate::dispatch::Relay;
use crate::transport::codec::{classify, Inbound};

const WRITER_DRAIN: Duration = Duration::from_secs(1);

pub async fn ws_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| {
        let conn = app.next_connection_id();
        let span = tracing::info_span!("session", conn = %conn);
        serve_connection(app, conn, socket).instrument(span)
    })
}

async fn serve_connection(app: AppState, conn: ConnectionId, socket: WebSocket) {
    let relay = app.relay();
    let (out_tx, out_rx) = mpsc::channel::<Message>(app.cfg().relay.outbound_queue);
    let (ws_tx, ws_rx) = socket.split();

    // separate writer so handling our own frame can enqueue to ourselves
    let mut writer = tokio::spawn(write_loop(ws_tx, out_rx).in_current_span());

    app.connections().attach(conn.clone(), out_tx.clone());
    app.metrics().connections_active.inc();
    relay.handle(&conn, RoutedEvent::Connect).await;
    tracing::info!("connected");

    if let Err(e) = read_loop(&app, &relay, &conn, ws_rx, &out_tx).await {
        tracing::debug!(error = %e, "read loop ended with error");
    }

    app.connections().detach(&conn);
    relay.handle(&conn, RoutedEvent::Disconnect).await;
    app.metrics().connections_active.dec();

    let _ = out_tx.try_send(Message::Close(None));
    drop(out_tx);
    if tokio::time::timeout(WRITER_DRAIN, &mut writer).await.is_err() {
        writer.abort();
    }
    tracing::info!("disconnected");
}

async fn read_loop(
    app: &AppState,
    relay: &Relay,
    conn: &ConnectionId,
    mut ws_rx: SplitStream<WebSocket>,
    out_tx: &mpsc::Sender<Message>,
) -> Result<()> {
    let gw = &app.cfg().gateway;
    let max_frame_bytes = app.cfg().relay.max_frame_bytes;
    let ping_every = Duration::from_millis(gw.ping_interval_ms);
    let idle_timeout = Duration::from_millis(gw.idle_timeout_ms);

    let mut ping_tick = interval_at(Instant::now() + ping_every, ping_every);
    ping_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else { break; };
                let msg = incoming.map_err(|e| ParleyError::Internal(format!("socket read: {e}")))?;
                last_activity = Instant::now();

                match classify(msg, max_frame_bytes) {
                    Inbound::Text(text) => {
                        relay.handle_text(conn, &text).await;
                    }
                    Inbound::Oversized { bytes_len } => {
                        app.metrics().dropped_frames.inc(&[("reason", "oversized")]);
                        tracing::warn!(bytes_len, max_frame_bytes, "dropping oversized frame");
                    }
                    Inbound::Binary { bytes_len } => {
                        app.metrics().dropped_frames.inc(&[("reason", "binary")]);
                        tracing::debug!(bytes_len, "ignoring binary frame");
                    }
                    // tungstenite answers pings on its own
                    Inbound::Ping | Inbound::Pong => {}
                    Inbound::Close => break,
                }
            }

            _ = ping_tick.tick() => {
                out_tx
                    .send(Message::Ping(Vec::new()))
                    .await
                    .map_err(|_| ParleyError::Internal("outbound queue closed".into()))?;
            }

            _ = sleep_until(last_activity + idle_timeout) => {
                tracing::info!(idle_ms = gw.idle_timeout_ms, "idle timeout");
                break;
            }
        }
    }

    Ok(())
}

async fn write_loop(mut ws_tx: SplitSink<WebSocket, Message>, mut out_rx: mpsc::Receiver<Message>) {
    while let Some(msg) = out_rx.recv().await {
        let closing = matches!(msg, Message::Close(_));
        if let Err(e) = ws_tx.send(msg).await {
            tracing::debug!(error = %e, "socket write failed");
            break;
        }
        if closing {
            break;
        }
    }
    let _ = ws_tx.close().await;
}
