#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use std::sync::Arc;

use axum::extract::ws::Message;
use serde_json::json;
use tokio::sync::mpsc;

use parley_core::{ParleyError, RoutedEvent};
use parley_gateway::dispatch::Relay;
use parley_gateway::obs::RelayMetrics;
use parley_gateway::realtime::{ConnectionTable, DeliverySink, SessionRegistry};

use common::{conn, harness, harness_with_timeout};

#[tokio::test]
async fn join_chat_and_leave_scenario() {
    let h = harness();
    let (a, b) = (conn("A"), conn("B"));

    h.relay.handle(&a, RoutedEvent::Connect).await;
    h.relay.handle_text(&a, r#"{"action":"setName","name":"Ann"}"#).await;
    h.relay.handle(&b, RoutedEvent::Connect).await;
    h.relay.handle_text(&b, r#"{"action":"setName","name":"Bo"}"#).await;
    h.sink.clear();

    h.relay.handle(&a, RoutedEvent::Disconnect).await;

    assert!(h.sink.received(&a).is_empty());
    assert_eq!(
        h.sink.received(&b),
        vec![
            json!({ "systemMessage": "Ann has left the chat" }),
            json!({ "members": ["Bo"] }),
        ]
    );
}

#[tokio::test]
async fn unnamed_peer_leaving_is_announced() {
    let h = harness();
    let (a, b) = (conn("A"), conn("B"));
    h.relay.handle(&a, RoutedEvent::Connect).await;
    h.relay.handle(&b, RoutedEvent::Connect).await;
    h.relay
        .handle(&b, RoutedEvent::SetName { name: "Bo".into() })
        .await;
    h.sink.clear();

    h.relay.handle(&a, RoutedEvent::Disconnect).await;

    assert_eq!(
        h.sink.received(&b),
        vec![
            json!({ "systemMessage": " has left the chat" }),
            json!({ "members": ["Bo"] }),
        ]
    );
}

#[tokio::test]
async fn everyone_sees_roster_and_join() {
    let h = harness();
    let (a, b) = (conn("A"), conn("B"));
    h.relay.handle(&a, RoutedEvent::Connect).await;
    h.relay.handle(&b, RoutedEvent::Connect).await;

    h.relay.handle_text(&a, r#"{"action":"setName","name":"Ann"}"#).await;

    let expected = vec![
        json!({ "members": ["Ann", ""] }),
        json!({ "systemMessage": "Ann has joined the chat" }),
    ];
    assert_eq!(h.sink.received(&a), expected);
    assert_eq!(h.sink.received(&b), expected);
}

#[tokio::test]
async fn public_message_reaches_sender_too() {
    let h = harness();
    let ids = [conn("A"), conn("B"), conn("C")];
    for id in &ids {
        h.relay.handle(id, RoutedEvent::Connect).await;
    }
    h.relay.handle_text(&ids[1], r#"{"action":"setName","name":"Bob"}"#).await;
    h.sink.clear();

    let report = h
        .relay
        .handle_text(&ids[1], r#"{"action":"sendPublic","message":"hi"}"#)
        .await;

    assert_eq!(report.attempted, 3);
    assert!(report.is_clean());
    for id in &ids {
        assert_eq!(h.sink.received(id), vec![json!({ "publicMessage": "Bob: hi" })]);
    }
}

#[tokio::test]
async fn private_message_reaches_only_recipient() {
    let h = harness();
    for (id, name) in [("A", "Ann"), ("B", "Bo"), ("C", "Carol")] {
        h.relay.handle(&conn(id), RoutedEvent::Connect).await;
        h.relay
            .handle(&conn(id), RoutedEvent::SetName { name: name.into() })
            .await;
    }
    h.sink.clear();

    h.relay
        .handle_text(&conn("A"), r#"{"action":"sendPrivate","to":"Carol","message":"psst"}"#)
        .await;

    assert_eq!(h.sink.received(&conn("C")), vec![json!({ "privateMessage": "Ann: psst" })]);
    assert_eq!(h.sink.total(), 1);
}

#[tokio::test]
async fn private_message_to_nobody_sends_nothing() {
    let h = harness();
    h.relay.handle(&conn("A"), RoutedEvent::Connect).await;
    h.sink.clear();

    let report = h
        .relay
        .handle_text(&conn("A"), r#"{"action":"sendPrivate","to":"Carol","message":"hi"}"#)
        .await;
    assert_eq!(report.attempted, 0);
    assert_eq!(h.sink.total(), 0);
}

#[tokio::test]
async fn malformed_frames_are_counted_and_ignored() {
    let h = harness();
    h.relay.handle(&conn("A"), RoutedEvent::Connect).await;

    for frame in ["{not json", r#"{"action":"sendPublic"}"#, r#"{"name":"x"}"#] {
        let report = h.relay.handle_text(&conn("A"), frame).await;
        assert_eq!(report.attempted, 0);
    }
    assert_eq!(h.sink.total(), 0);
    assert_eq!(
        h.metrics.dropped_frames.get(&[("reason", "malformed_payload")]),
        3
    );

    // still alive afterwards
    h.relay
        .handle_text(&conn("A"), r#"{"action":"sendPublic","message":"ok"}"#)
        .await;
    assert_eq!(h.sink.total(), 1);
}

#[tokio::test]
async fn one_failing_recipient_does_not_block_others() {
    let h = harness();
    let ids = [conn("A"), conn("B"), conn("C")];
    for id in &ids {
        h.relay.handle(id, RoutedEvent::Connect).await;
    }
    h.sink.fail_for(&ids[1]);

    let report = h
        .relay
        .handle_text(&ids[0], r#"{"action":"sendPublic","message":"hi"}"#)
        .await;

    assert_eq!(report.attempted, 3);
    assert_eq!(report.delivered, 2);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        &report.failures[0],
        ParleyError::DeliveryFailure { conn, .. } if conn == &ids[1]
    ));
    assert_eq!(h.sink.received(&ids[0]).len(), 1);
    assert_eq!(h.sink.received(&ids[2]).len(), 1);
    assert_eq!(h.metrics.deliveries.get(&[("result", "failed")]), 1);
}

#[tokio::test]
async fn stuck_recipient_times_out_without_holding_back_the_rest() {
    let h = harness_with_timeout(50);
    let ids = [conn("A"), conn("B")];
    for id in &ids {
        h.relay.handle(id, RoutedEvent::Connect).await;
    }
    h.sink.hang_for(&ids[0]);

    let report = h
        .relay
        .handle_text(&ids[1], r#"{"action":"setName","name":"Bo"}"#)
        .await;

    // two broadcasts, two recipients each
    assert_eq!(report.attempted, 4);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(h.sink.received(&ids[1]).len(), 2);
}

#[tokio::test]
async fn double_disconnect_broadcasts_leave_once() {
    let h = harness();
    let (a, b) = (conn("A"), conn("B"));
    for (id, name) in [(&a, "Ann"), (&b, "Bo")] {
        h.relay.handle(id, RoutedEvent::Connect).await;
        h.relay
            .handle(id, RoutedEvent::SetName { name: name.into() })
            .await;
    }
    h.sink.clear();

    h.relay.handle(&a, RoutedEvent::Disconnect).await;
    h.relay.handle(&a, RoutedEvent::Disconnect).await;

    assert_eq!(h.sink.received(&b).len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sessions_keep_registry_exact() {
    let h = Arc::new(harness());

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let h = Arc::clone(&h);
            tokio::spawn(async move {
                let id = conn(&format!("c{i}"));
                h.relay.handle(&id, RoutedEvent::Connect).await;
                h.relay
                    .handle(&id, RoutedEvent::SetName { name: format!("u{i}") })
                    .await;
                h.relay
                    .handle_text(&id, r#"{"action":"sendPublic","message":"hey"}"#)
                    .await;
                if i % 4 == 0 {
                    h.relay.handle(&id, RoutedEvent::Disconnect).await;
                }
            })
        })
        .collect();
    for t in tasks {
        t.await.unwrap();
    }

    assert_eq!(h.registry.len(), 24);
    for i in 0..32 {
        assert_eq!(h.registry.contains(&conn(&format!("c{i}"))), i % 4 != 0);
    }
}

#[tokio::test]
async fn connection_table_feeds_outbound_queues() {
    let registry = Arc::new(SessionRegistry::new());
    let table = Arc::new(ConnectionTable::new());
    let sink: Arc<dyn DeliverySink> = table.clone();
    let relay = Relay::new(
        Arc::clone(&registry),
        sink,
        100,
        Arc::new(RelayMetrics::default()),
    );

    let (tx_a, mut rx_a) = mpsc::channel(8);
    let (tx_b, rx_b) = mpsc::channel(8);
    table.attach(conn("A"), tx_a);
    table.attach(conn("B"), tx_b);
    relay.handle(&conn("A"), RoutedEvent::Connect).await;
    relay.handle(&conn("B"), RoutedEvent::Connect).await;

    // B's writer has gone away
    drop(rx_b);

    let report = relay
        .handle_text(&conn("A"), r#"{"action":"sendPublic","message":"hi"}"#)
        .await;
    assert_eq!(report.delivered, 1);
    assert_eq!(report.failures.len(), 1);

    match rx_a.recv().await {
        Some(Message::Text(s)) => assert_eq!(s, r#"{"publicMessage":": hi"}"#),
        other => panic!("unexpected {other:?}"),
    }
}
