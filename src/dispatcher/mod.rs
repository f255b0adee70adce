//! Routes decoded client frames to the broadcaster.

mod test;

use crate::broadcaster::Broadcaster;
use crate::connection::Connection;
use crate::message::{decode, ClientMessage, Inbound, MessageKind};
use crate::response::ServerMessage;
use tracing::{debug, warn};

/// What the router did with a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    Handled(MessageKind),
    /// The sender was answered with an `error` frame.
    Malformed,
    /// Unknown `type`; logged and dropped.
    Ignored(Option<String>),
}

/// Handles one raw text frame from `sender`.
pub fn route(broadcaster: &mut Broadcaster, sender: &Connection, text: &str) -> Routed {
    let inbound = match decode(text) {
        Ok(inbound) => inbound,
        Err(e) => {
            warn!(connection = sender.id(), "rejecting frame: {}", e);
            reject(broadcaster, sender);
            return Routed::Malformed;
        }
    };

    let message = match inbound {
        Inbound::Message(message) => message,
        Inbound::Unknown(tag) => {
            warn!(connection = sender.id(), "ignoring frame with unknown type {:?}", tag);
            return Routed::Ignored(tag);
        }
    };

    let kind = message.kind();
    debug!(connection = sender.id(), kind = kind.as_str(), "routing frame");

    match message {
        ClientMessage::JoinRoom { room_id, user } => {
            broadcaster.handle_join(sender, &room_id, &user);
        }
        ClientMessage::LeaveRoom { room_id, user } => {
            broadcaster.handle_leave(&room_id, &user);
        }
        ClientMessage::ChatMessage {
            room_id,
            message,
            sender: name,
        } => {
            broadcaster.handle_chat(&room_id, message, &name);
        }
        ClientMessage::Offer(relay)
        | ClientMessage::Answer(relay)
        | ClientMessage::IceCandidate(relay)
        | ClientMessage::VoiceRecognitionResult(relay) => {
            broadcaster.handle_relay(sender, &relay.room_id, text);
        }
        ClientMessage::StopSession { room_id } => {
            broadcaster.handle_stop(&room_id);
        }
        ClientMessage::Notification { message, date } => {
            broadcaster.handle_global(&ServerMessage::Notification { message, date });
        }
        ClientMessage::FetchAction { message } => {
            broadcaster.handle_global(&ServerMessage::FetchAction { message });
        }
    }

    Routed::Handled(kind)
}

/// Answers `sender` with the `error` frame used for every malformed input.
pub fn reject(broadcaster: &Broadcaster, sender: &Connection) {
    broadcaster.send_to(sender, &ServerMessage::invalid_format());
}
