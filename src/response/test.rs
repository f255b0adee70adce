#[cfg(test)]
mod tests {
    use crate::response::{ServerMessage, INVALID_FORMAT_MESSAGE, ROOM_FULL_MESSAGE};
    use serde_json::{json, Value};

    fn to_json(message: &ServerMessage) -> Value {
        let frame = message.to_frame().unwrap();
        serde_json::from_str(&frame).unwrap()
    }

    #[test]
    fn test_rejection_shapes() {
        assert_eq!(
            to_json(&ServerMessage::room_full("/")),
            json!({"type": "room-full", "message": ROOM_FULL_MESSAGE, "redirectURL": "/"})
        );

        let duplicate = to_json(&ServerMessage::user_already_in_room("/home"));
        assert_eq!(duplicate["type"], "user-already-in-room");
        assert_eq!(duplicate["redirectURL"], "/home");
        assert!(duplicate["message"].is_string());
    }

    #[test]
    fn test_room_event_shapes() {
        assert_eq!(
            to_json(&ServerMessage::JoinRoom {
                user: "alice".to_string()
            }),
            json!({"type": "join-room", "user": "alice"})
        );
        assert_eq!(
            to_json(&ServerMessage::LeaveRoom {
                user: "bob".to_string()
            }),
            json!({"type": "leave-room", "user": "bob"})
        );
        assert_eq!(
            to_json(&ServerMessage::StopSession),
            json!({"type": "stop-session"})
        );
    }

    #[test]
    fn test_chat_shape() {
        let chat = ServerMessage::ChatMessage {
            message: json!({"text": "hello"}),
            room_id: "R1".to_string(),
            sender: "alice".to_string(),
        };
        assert_eq!(
            to_json(&chat),
            json!({
                "type": "chat-message",
                "message": {"text": "hello"},
                "roomID": "R1",
                "sender": "alice"
            })
        );
    }

    #[test]
    fn test_global_shapes() {
        assert_eq!(
            to_json(&ServerMessage::Notification {
                message: json!("booked"),
                date: json!(1714521600000u64),
            }),
            json!({"type": "notification", "message": "booked", "date": 1714521600000u64})
        );
        assert_eq!(
            to_json(&ServerMessage::FetchAction {
                message: json!("appointments")
            }),
            json!({"type": "fetch-action", "message": "appointments"})
        );
    }

    #[test]
    fn test_error_shape() {
        assert_eq!(
            to_json(&ServerMessage::invalid_format()),
            json!({"type": "error", "message": INVALID_FORMAT_MESSAGE})
        );
        assert_eq!(INVALID_FORMAT_MESSAGE, "Invalid message format");
    }
}
