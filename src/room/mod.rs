//! Rooms and the join/leave/stop state machine.
//!
//! A room pairs the two participants of one appointment. It exists only while it
//! has occupants: created on the first accepted join, removed when the last
//! occupant leaves or when the session is stopped.


use crate::connection::Connection;
use std::collections::HashMap;

/// Maximum number of simultaneous occupants of a room.
pub const ROOM_CAPACITY: usize = 2;

/// A named participant in a room.
#[derive(Debug, Clone)]
pub struct Occupant {
    pub name: String,
    pub connection: Connection,
}

#[derive(Debug)]
pub struct Room {
    id: String,
    occupants: Vec<Occupant>,
}

impl Room {
    fn new(id: String) -> Self {
        Room {
            id,
            occupants: Vec::with_capacity(ROOM_CAPACITY),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn occupants(&self) -> &[Occupant] {
        &self.occupants
    }

    pub fn names(&self) -> Vec<String> {
        self.occupants.iter().map(|o| o.name.clone()).collect()
    }

    pub fn has_user(&self, name: &str) -> bool {
        self.occupants.iter().any(|o| o.name == name)
    }

    pub fn is_full(&self) -> bool {
        self.occupants.len() >= ROOM_CAPACITY
    }

    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    /// Another occupant already uses the requested name.
    AlreadyInRoom,
    Full,
}

#[derive(Debug)]
pub enum LeaveOutcome {
    /// The room does not exist or nobody by that name was in it.
    NotPresent,
    /// Occupants were removed and the room still has others in it.
    Departed(Vec<Occupant>),
    /// The last occupant left and the room was deleted.
    Emptied(Vec<Occupant>),
}

#[derive(Default)]
pub struct RoomTable {
    rooms: HashMap<String, Room>,
}

impl RoomTable {
    pub fn new() -> Self {
        RoomTable {
            rooms: HashMap::new(),
        }
    }

    pub fn get(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn contains(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Seats `name` in the room, creating the room if needed.
    ///
    /// Rejections never touch existing occupants.
    pub fn join(&mut self, room_id: &str, name: &str, connection: Connection) -> JoinOutcome {
        if let Some(room) = self.rooms.get(room_id) {
            if room.has_user(name) {
                return JoinOutcome::AlreadyInRoom;
            }
            if room.is_full() {
                return JoinOutcome::Full;
            }
        }

        let room = self
            .rooms
            .entry(room_id.to_string())
            .or_insert_with(|| Room::new(room_id.to_string()));
        room.occupants.push(Occupant {
            name: name.to_string(),
            connection,
        });
        JoinOutcome::Joined
    }

    pub fn leave(&mut self, room_id: &str, name: &str) -> LeaveOutcome {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return LeaveOutcome::NotPresent;
        };

        let (removed, kept): (Vec<_>, Vec<_>) = room
            .occupants
            .drain(..)
            .partition(|occupant| occupant.name == name);
        room.occupants = kept;

        if room.occupants.is_empty() {
            self.rooms.remove(room_id);
            if removed.is_empty() {
                return LeaveOutcome::NotPresent;
            }
            return LeaveOutcome::Emptied(removed);
        }
        if removed.is_empty() {
            return LeaveOutcome::NotPresent;
        }
        LeaveOutcome::Departed(removed)
    }

    /// Removes the room unconditionally and hands back its occupants.
    pub fn stop(&mut self, room_id: &str) -> Option<Room> {
        self.rooms.remove(room_id)
    }
}
