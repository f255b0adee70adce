//! Inbound frames sent by clients to the hub.


use crate::error::HubError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;

/// The `type` tag of an inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    JoinRoom,
    LeaveRoom,
    ChatMessage,
    Offer,
    Answer,
    IceCandidate,
    VoiceRecognitionResult,
    StopSession,
    Notification,
    FetchAction,
}

impl MessageKind {
    pub fn from_tag(tag: &str) -> Option<MessageKind> {
        let kind = match tag {
            "join-room" => MessageKind::JoinRoom,
            "leave-room" => MessageKind::LeaveRoom,
            "chat-message" => MessageKind::ChatMessage,
            "offer" => MessageKind::Offer,
            "answer" => MessageKind::Answer,
            "ice-candidate" => MessageKind::IceCandidate,
            "voice-recognition-result" => MessageKind::VoiceRecognitionResult,
            "stop-session" => MessageKind::StopSession,
            "notification" => MessageKind::Notification,
            "fetch-action" => MessageKind::FetchAction,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::JoinRoom => "join-room",
            MessageKind::LeaveRoom => "leave-room",
            MessageKind::ChatMessage => "chat-message",
            MessageKind::Offer => "offer",
            MessageKind::Answer => "answer",
            MessageKind::IceCandidate => "ice-candidate",
            MessageKind::VoiceRecognitionResult => "voice-recognition-result",
            MessageKind::StopSession => "stop-session",
            MessageKind::Notification => "notification",
            MessageKind::FetchAction => "fetch-action",
        }
    }
}

/// Opaque payload relayed between the two peers of a room.
///
/// Only `roomID` is interpreted; everything else (SDP, ICE candidate, transcript...)
/// is kept as-is in `payload`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Relay {
    #[serde(rename = "roomID")]
    pub room_id: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// A frame received from a client, keyed on its `type` field.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinRoom {
        #[serde(rename = "roomID")]
        room_id: String,
        user: String,
    },
    LeaveRoom {
        #[serde(rename = "roomID")]
        room_id: String,
        user: String,
    },
    ChatMessage {
        #[serde(rename = "roomID")]
        room_id: String,
        message: Value,
        sender: String,
    },
    Offer(Relay),
    Answer(Relay),
    IceCandidate(Relay),
    VoiceRecognitionResult(Relay),
    StopSession {
        #[serde(rename = "roomID")]
        room_id: String,
    },
    Notification {
        message: Value,
        date: Value,
    },
    FetchAction {
        message: Value,
    },
}

impl ClientMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            ClientMessage::JoinRoom { .. } => MessageKind::JoinRoom,
            ClientMessage::LeaveRoom { .. } => MessageKind::LeaveRoom,
            ClientMessage::ChatMessage { .. } => MessageKind::ChatMessage,
            ClientMessage::Offer(_) => MessageKind::Offer,
            ClientMessage::Answer(_) => MessageKind::Answer,
            ClientMessage::IceCandidate(_) => MessageKind::IceCandidate,
            ClientMessage::VoiceRecognitionResult(_) => MessageKind::VoiceRecognitionResult,
            ClientMessage::StopSession { .. } => MessageKind::StopSession,
            ClientMessage::Notification { .. } => MessageKind::Notification,
            ClientMessage::FetchAction { .. } => MessageKind::FetchAction,
        }
    }
}

/// Result of decoding one text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Message(ClientMessage),
    /// Valid JSON whose `type` is missing, not a string, or not one the hub handles.
    Unknown(Option<String>),
}

/// Decodes a raw text frame.
///
/// Fails when the text is not JSON or when a known message kind lacks its
/// required fields. Unknown kinds are not an error.
pub fn decode(text: &str) -> Result<Inbound, HubError> {
    let value: Value = serde_json::from_str(text)?;

    let tag = match value.get("type") {
        Some(Value::String(tag)) => tag.clone(),
        Some(other) => return Ok(Inbound::Unknown(Some(other.to_string()))),
        None => return Ok(Inbound::Unknown(None)),
    };
    if MessageKind::from_tag(&tag).is_none() {
        return Ok(Inbound::Unknown(Some(tag)));
    }

    let message = serde_json::from_value(value)?;
    Ok(Inbound::Message(message))
}
