
use crate::connection::{Connection, ConnectionId};
use crate::registry::ConnectionRegistry;
use crate::response::ServerMessage;
use crate::room::{JoinOutcome, LeaveOutcome, RoomTable};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Owns the connection registry and the room table, and delivers frames to them.
///
/// Every method runs to completion without awaiting; callers serialize access
/// (see [`crate::hub::Hub`]).
pub struct Broadcaster {
    registry: ConnectionRegistry,
    rooms: RoomTable,
    redirect_url: String,
}

impl Broadcaster {
    pub fn new(redirect_url: impl Into<String>) -> Broadcaster {
        Broadcaster {
            registry: ConnectionRegistry::new(),
            rooms: RoomTable::new(),
            redirect_url: redirect_url.into(),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn rooms(&self) -> &RoomTable {
        &self.rooms
    }

    pub fn add_connection(&mut self, connection: Connection) {
        self.registry.register(connection);
    }

    /// Drops a connection from the registry. With `release_seats`, every room seat it
    /// still held goes through the regular leave path.
    ///
    /// Returns the number of seats released.
    pub fn remove_connection(&mut self, id: ConnectionId, release_seats: bool) -> usize {
        let seats = self.registry.unregister(id);
        if !release_seats {
            if !seats.is_empty() {
                debug!(connection = id, seats = seats.len(), "leaving stale seats in place");
            }
            return 0;
        }
        seats
            .iter()
            .filter(|seat| self.handle_leave(&seat.room_id, &seat.user))
            .count()
    }

    fn encode(message: &ServerMessage) -> Option<Arc<str>> {
        match message.to_frame() {
            Ok(frame) => Some(frame),
            Err(e) => {
                warn!("failed to serialize {} frame: {}", message.type_str(), e);
                None
            }
        }
    }

    fn deliver(connection: &Connection, frame: &Arc<str>) -> bool {
        match connection.send(frame.clone()) {
            Ok(()) => true,
            Err(e) => {
                debug!(connection = connection.id(), "dropping frame: {}", e);
                false
            }
        }
    }

    pub fn send_to(&self, connection: &Connection, message: &ServerMessage) -> bool {
        match Self::encode(message) {
            Some(frame) => Self::deliver(connection, &frame),
            None => false,
        }
    }

    /// Sends `frame` to every open occupant of the room except `exclude`.
    /// Returns how many occupants accepted it; an absent room yields 0.
    pub fn broadcast_to_room(
        &self,
        room_id: &str,
        frame: &Arc<str>,
        exclude: Option<ConnectionId>,
    ) -> usize {
        let Some(room) = self.rooms.get(room_id) else {
            return 0;
        };
        room.occupants()
            .iter()
            .map(|occupant| &occupant.connection)
            .filter(|connection| Some(connection.id()) != exclude && connection.is_open())
            .filter(|connection| Self::deliver(connection, frame))
            .count()
    }

    /// Sends `frame` to every open connection in the registry.
    pub fn broadcast_all(&self, frame: &Arc<str>) -> usize {
        self.registry
            .open_connections()
            .filter(|connection| Self::deliver(connection, frame))
            .count()
    }

    pub fn handle_join(&mut self, connection: &Connection, room_id: &str, user: &str) -> JoinOutcome {
        let outcome = self.rooms.join(room_id, user, connection.clone());
        match outcome {
            JoinOutcome::Joined => {
                self.registry.add_membership(connection.id(), room_id, user);
                info!(connection = connection.id(), room = room_id, user, "joined room");
                if let Some(frame) = Self::encode(&ServerMessage::JoinRoom {
                    user: user.to_string(),
                }) {
                    self.broadcast_to_room(room_id, &frame, None);
                }
            }
            JoinOutcome::AlreadyInRoom => {
                warn!(connection = connection.id(), room = room_id, user, "name already taken in room");
                self.send_to(connection, &ServerMessage::user_already_in_room(&self.redirect_url));
            }
            JoinOutcome::Full => {
                warn!(connection = connection.id(), room = room_id, user, "room is full");
                self.send_to(connection, &ServerMessage::room_full(&self.redirect_url));
                connection.close();
            }
        }
        outcome
    }

    /// Removes `user` from the room. Returns false when there was nothing to remove.
    pub fn handle_leave(&mut self, room_id: &str, user: &str) -> bool {
        match self.rooms.leave(room_id, user) {
            LeaveOutcome::NotPresent => false,
            LeaveOutcome::Emptied(removed) => {
                for occupant in &removed {
                    self.registry
                        .remove_membership(occupant.connection.id(), room_id, &occupant.name);
                }
                info!(room = room_id, user, "last occupant left, room removed");
                true
            }
            LeaveOutcome::Departed(removed) => {
                for occupant in &removed {
                    self.registry
                        .remove_membership(occupant.connection.id(), room_id, &occupant.name);
                }
                info!(room = room_id, user, "left room");
                if let Some(frame) = Self::encode(&ServerMessage::LeaveRoom {
                    user: user.to_string(),
                }) {
                    self.broadcast_to_room(room_id, &frame, None);
                }
                true
            }
        }
    }

    /// Ends the session: every occupant is told to stop and disconnected, and the room
    /// is removed. Returns the number of occupants evicted.
    pub fn handle_stop(&mut self, room_id: &str) -> usize {
        let Some(room) = self.rooms.stop(room_id) else {
            return 0;
        };
        let frame = Self::encode(&ServerMessage::StopSession);
        for occupant in room.occupants() {
            if let Some(frame) = &frame {
                Self::deliver(&occupant.connection, frame);
            }
            occupant.connection.close();
            self.registry
                .remove_membership(occupant.connection.id(), room_id, &occupant.name);
        }
        info!(room = room_id, evicted = room.len(), "session stopped");
        room.len()
    }

    pub fn handle_chat(&self, room_id: &str, message: Value, sender: &str) -> usize {
        let chat = ServerMessage::ChatMessage {
            message,
            room_id: room_id.to_string(),
            sender: sender.to_string(),
        };
        match Self::encode(&chat) {
            Some(frame) => self.broadcast_to_room(room_id, &frame, None),
            None => 0,
        }
    }

    /// Forwards a peer's frame untouched to the other occupants of the room.
    pub fn handle_relay(&self, sender: &Connection, room_id: &str, raw: &str) -> usize {
        let frame: Arc<str> = Arc::from(raw);
        self.broadcast_to_room(room_id, &frame, Some(sender.id()))
    }

    pub fn handle_global(&self, message: &ServerMessage) -> usize {
        match Self::encode(message) {
            Some(frame) => self.broadcast_all(&frame),
            None => 0,
        }
    }
}
