use std::sync::Arc;

use parley_core::{ConnectionId, Delivery, Outbound, RoutedEvent};

use crate::realtime::SessionRegistry;

/// Turns one routed event into registry mutations and a delivery list.
///
/// Stateless between events: everything it knows lives in the registry.
/// Never fails; unknown senders and unknown actions are logged and yield no
/// deliveries.
pub struct EventRouter {
    registry: Arc<SessionRegistry>,
}

impl EventRouter {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn route(&self, conn: &ConnectionId, event: RoutedEvent) -> Vec<Delivery> {
        match event {
            RoutedEvent::Connect => {
                if !self.registry.register(conn.clone()) {
                    tracing::debug!(conn = %conn, "connect for already registered connection");
                }
                Vec::new()
            }
            RoutedEvent::Disconnect => self.on_disconnect(conn),
            RoutedEvent::SetName { name } => self.on_set_name(conn, name),
            RoutedEvent::SendPublic { message } => {
                let Some(sender) = self.sender_name(conn) else {
                    return Vec::new();
                };
                vec![Delivery::broadcast(Outbound::public(&sender, &message))]
            }
            RoutedEvent::SendPrivate { to, message } => {
                let Some(sender) = self.sender_name(conn) else {
                    return Vec::new();
                };
                match self.registry.resolve_by_name(&to) {
                    Some(target) => vec![Delivery::to(target, Outbound::private(&sender, &message))],
                    None => {
                        // no reply to the sender exists in the protocol
                        tracing::debug!(conn = %conn, to = %to, "private recipient not found");
                        Vec::new()
                    }
                }
            }
            RoutedEvent::Unknown(action) => {
                tracing::info!(conn = %conn, action = %action, "unknown action");
                Vec::new()
            }
        }
    }

    fn on_disconnect(&self, conn: &ConnectionId) -> Vec<Delivery> {
        // `remove` hands back the pre-removal entry exactly once, so a repeated
        // disconnect produces nothing.
        let Some(departed) = self.registry.remove(conn) else {
            tracing::debug!(conn = %conn, "disconnect for unregistered connection");
            return Vec::new();
        };

        // unnamed participants render as "", same as in the roster
        vec![
            Delivery::broadcast(Outbound::left(departed.display_name())),
            Delivery::broadcast(Outbound::Members(self.registry.members())),
        ]
    }

    fn on_set_name(&self, conn: &ConnectionId, name: String) -> Vec<Delivery> {
        if let Err(e) = self.registry.set_name(conn, name.clone()) {
            tracing::warn!(conn = %conn, error = %e, "setName ignored");
            return Vec::new();
        }
        vec![
            Delivery::broadcast(Outbound::Members(self.registry.members())),
            Delivery::broadcast(Outbound::joined(&name)),
        ]
    }

    /// Sender's display name; unnamed renders as "". None if unregistered.
    fn sender_name(&self, conn: &ConnectionId) -> Option<String> {
        match self.registry.name_of(conn) {
            Ok(name) => Some(name.unwrap_or_default()),
            Err(e) => {
                tracing::warn!(conn = %conn, error = %e, "message from unregistered connection");
                None
            }
        }
    }
}
