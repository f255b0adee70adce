mod test;

use crate::error::HubError;
use serde::ser::SerializeStruct;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

pub const USER_ALREADY_IN_ROOM_MESSAGE: &str = "User is already in the room";
pub const ROOM_FULL_MESSAGE: &str = "Room is full";
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid message format";

/// Frames produced by the hub.
///
/// Relayed signaling frames are not represented here: they go out as the exact
/// text the peer sent.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    UserAlreadyInRoom { message: String, redirect_url: String },
    RoomFull { message: String, redirect_url: String },
    JoinRoom { user: String },
    LeaveRoom { user: String },
    ChatMessage { message: Value, room_id: String, sender: String },
    StopSession,
    Notification { message: Value, date: Value },
    FetchAction { message: Value },
    Error { message: String },
}

const RESPONSE_STR: &str = "response";
const TYPE_STR: &str = "type";
const MESSAGE_STR: &str = "message";
const REDIRECT_STR: &str = "redirectURL";
const USER_STR: &str = "user";
const ROOM_STR: &str = "roomID";
const SENDER_STR: &str = "sender";
const DATE_STR: &str = "date";

impl ServerMessage {
    pub fn user_already_in_room(redirect_url: &str) -> Self {
        ServerMessage::UserAlreadyInRoom {
            message: USER_ALREADY_IN_ROOM_MESSAGE.to_string(),
            redirect_url: redirect_url.to_string(),
        }
    }

    pub fn room_full(redirect_url: &str) -> Self {
        ServerMessage::RoomFull {
            message: ROOM_FULL_MESSAGE.to_string(),
            redirect_url: redirect_url.to_string(),
        }
    }

    pub fn invalid_format() -> Self {
        ServerMessage::Error {
            message: INVALID_FORMAT_MESSAGE.to_string(),
        }
    }

    pub fn type_str(&self) -> &'static str {
        match self {
            ServerMessage::UserAlreadyInRoom { .. } => "user-already-in-room",
            ServerMessage::RoomFull { .. } => "room-full",
            ServerMessage::JoinRoom { .. } => "join-room",
            ServerMessage::LeaveRoom { .. } => "leave-room",
            ServerMessage::ChatMessage { .. } => "chat-message",
            ServerMessage::StopSession => "stop-session",
            ServerMessage::Notification { .. } => "notification",
            ServerMessage::FetchAction { .. } => "fetch-action",
            ServerMessage::Error { .. } => "error",
        }
    }

    /// Serializes the message into a text frame that can be shared between recipients.
    pub fn to_frame(&self) -> Result<Arc<str>, HubError> {
        Ok(Arc::from(serde_json::to_string(self)?))
    }
}

impl serde::ser::Serialize for ServerMessage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        let mut s = serializer.serialize_struct(RESPONSE_STR, 4)?;
        s.serialize_field(TYPE_STR, self.type_str())?;
        match self {
            ServerMessage::UserAlreadyInRoom {
                message,
                redirect_url,
            }
            | ServerMessage::RoomFull {
                message,
                redirect_url,
            } => {
                s.serialize_field(MESSAGE_STR, message)?;
                s.serialize_field(REDIRECT_STR, redirect_url)?;
            }
            ServerMessage::JoinRoom { user } | ServerMessage::LeaveRoom { user } => {
                s.serialize_field(USER_STR, user)?;
            }
            ServerMessage::ChatMessage {
                message,
                room_id,
                sender,
            } => {
                s.serialize_field(MESSAGE_STR, message)?;
                s.serialize_field(ROOM_STR, room_id)?;
                s.serialize_field(SENDER_STR, sender)?;
            }
            ServerMessage::StopSession => {}
            ServerMessage::Notification { message, date } => {
                s.serialize_field(MESSAGE_STR, message)?;
                s.serialize_field(DATE_STR, date)?;
            }
            ServerMessage::FetchAction { message } => {
                s.serialize_field(MESSAGE_STR, message)?;
            }
            ServerMessage::Error { message } => {
                s.serialize_field(MESSAGE_STR, message)?;
            }
        }
        s.end()
    }
}
