use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use parley_core::error::{ParleyError, Result};
use parley_core::ConnectionId;

#[derive(Debug, Clone)]
struct Participant {
    name: Option<String>,
    joined_seq: u64,
}

/// One roster line: a connection and its (possibly unset) display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub conn: ConnectionId,
    pub name: Option<String>,
}

impl RosterEntry {
    /// Name as rendered to clients; unnamed participants render as "".
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// Session registry: `connection_id -> participant`.
///
/// The single source of truth for who is online. Ordering is registration
/// order, tracked with a monotonic sequence since the map itself is unordered.
#[derive(Default)]
pub struct SessionRegistry {
    participants: DashMap<ConnectionId, Participant>,
    seq: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            participants: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    /// Insert an unnamed participant. Idempotent: an existing entry keeps its
    /// name and its place in the roster. Returns whether an entry was created.
    pub fn register(&self, conn: ConnectionId) -> bool {
        let mut created = false;
        self.participants.entry(conn).or_insert_with(|| {
            created = true;
            Participant {
                name: None,
                joined_seq: self.seq.fetch_add(1, Ordering::Relaxed),
            }
        });
        created
    }

    /// Overwrite the display name. Names are not unique.
    pub fn set_name(&self, conn: &ConnectionId, name: impl Into<String>) -> Result<()> {
        let mut p = self
            .participants
            .get_mut(conn)
            .ok_or_else(|| ParleyError::UnknownConnection(conn.clone()))?;
        p.name = Some(name.into());
        Ok(())
    }

    /// Remove the entry. Only the first call for a given id gets `Some`, which
    /// carries the state as it was just before removal.
    pub fn remove(&self, conn: &ConnectionId) -> Option<RosterEntry> {
        self.participants
            .remove(conn)
            .map(|(conn, p)| RosterEntry { conn, name: p.name })
    }

    pub fn name_of(&self, conn: &ConnectionId) -> Result<Option<String>> {
        self.participants
            .get(conn)
            .map(|p| p.name.clone())
            .ok_or_else(|| ParleyError::UnknownConnection(conn.clone()))
    }

    pub fn contains(&self, conn: &ConnectionId) -> bool {
        self.participants.contains_key(conn)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// All participants in registration order.
    pub fn names(&self) -> Vec<RosterEntry> {
        let mut entries: Vec<(u64, RosterEntry)> = self
            .participants
            .iter()
            .map(|r| {
                (
                    r.value().joined_seq,
                    RosterEntry {
                        conn: r.key().clone(),
                        name: r.value().name.clone(),
                    },
                )
            })
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, e)| e).collect()
    }

    /// Roster as sent to clients.
    pub fn members(&self) -> Vec<String> {
        self.names()
            .iter()
            .map(|e| e.display_name().to_string())
            .collect()
    }

    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.names().into_iter().map(|e| e.conn).collect()
    }

    /// First connection (by registration order) whose name equals `name`.
    pub fn resolve_by_name(&self, name: &str) -> Option<ConnectionId> {
        let mut best: Option<(u64, ConnectionId)> = None;
        for r in self.participants.iter() {
            if r.value().name.as_deref() != Some(name) {
                continue;
            }
            let seq = r.value().joined_seq;
            if best.as_ref().map_or(true, |(b, _)| seq < *b) {
                best = Some((seq, r.key().clone()));
            }
        }
        best.map(|(_, conn)| conn)
    }
}
