//! Process-wide set of live connections.
//!
//! Registry membership is what global broadcast iterates. Each entry also remembers
//! which room seats the connection holds, so a transport close can release them.


use crate::connection::{Connection, ConnectionId};
use std::collections::HashMap;

/// A room seat held by a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub room_id: String,
    pub user: String,
}

struct Entry {
    connection: Connection,
    memberships: Vec<Membership>,
}

#[derive(Default)]
pub struct ConnectionRegistry {
    entries: HashMap<ConnectionId, Entry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        ConnectionRegistry {
            entries: HashMap::new(),
        }
    }

    /// Adds a connection. Registering the same connection twice keeps the existing entry.
    pub fn register(&mut self, connection: Connection) {
        self.entries
            .entry(connection.id())
            .or_insert_with(|| Entry {
                connection,
                memberships: Vec::new(),
            });
    }

    /// Removes a connection, returning the room seats it still held.
    /// Unknown ids are ignored.
    pub fn unregister(&mut self, id: ConnectionId) -> Vec<Membership> {
        self.entries
            .remove(&id)
            .map(|entry| entry.memberships)
            .unwrap_or_default()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn open_connections(&self) -> impl Iterator<Item = &Connection> {
        self.entries
            .values()
            .map(|entry| &entry.connection)
            .filter(|connection| connection.is_open())
    }

    pub fn add_membership(&mut self, id: ConnectionId, room_id: &str, user: &str) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.memberships.push(Membership {
                room_id: room_id.to_string(),
                user: user.to_string(),
            });
        }
    }

    pub fn remove_membership(&mut self, id: ConnectionId, room_id: &str, user: &str) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry
                .memberships
                .retain(|m| !(m.room_id == room_id && m.user == user));
        }
    }

    pub fn memberships(&self, id: ConnectionId) -> &[Membership] {
        self.entries
            .get(&id)
            .map(|entry| entry.memberships.as_slice())
            .unwrap_or(&[])
    }
}
