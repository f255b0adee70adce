#[cfg(test)]
mod tests {
    use crate::broadcaster::Broadcaster;
    use crate::connection::{Connection, Outbox};
    use crate::dispatcher::{route, Routed};
    use crate::message::MessageKind;
    use serde_json::{json, Value};

    fn connect(broadcaster: &mut Broadcaster) -> (Connection, Outbox) {
        let (conn, outbox) = Connection::open(16);
        broadcaster.add_connection(conn.clone());
        (conn, outbox)
    }

    fn drain(outbox: &mut Outbox) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Some(frame) = outbox.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    fn join(broadcaster: &mut Broadcaster, conn: &Connection, room: &str, user: &str) -> Routed {
        let frame = json!({"type": "join-room", "roomID": room, "user": user}).to_string();
        route(broadcaster, conn, &frame)
    }

    #[test]
    fn test_malformed_json_gets_single_error() {
        let mut broadcaster = Broadcaster::new("/");
        let (conn, mut outbox) = connect(&mut broadcaster);
        let (other, mut other_outbox) = connect(&mut broadcaster);
        join(&mut broadcaster, &other, "R1", "alice");
        drain(&mut other_outbox);

        let routed = route(&mut broadcaster, &conn, "{not json");

        assert_eq!(routed, Routed::Malformed);
        assert_eq!(
            drain(&mut outbox),
            vec![json!({"type": "error", "message": "Invalid message format"})]
        );
        assert!(drain(&mut other_outbox).is_empty());
        assert!(conn.is_open());
        assert_eq!(broadcaster.registry().len(), 2);
        assert_eq!(broadcaster.rooms().len(), 1);
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let mut broadcaster = Broadcaster::new("/");
        let (conn, mut outbox) = connect(&mut broadcaster);

        let routed = route(&mut broadcaster, &conn, r#"{"type":"join-room","user":"alice"}"#);

        assert_eq!(routed, Routed::Malformed);
        assert_eq!(drain(&mut outbox)[0]["type"], "error");
        assert!(broadcaster.rooms().is_empty());
    }

    #[test]
    fn test_unknown_type_is_silent() {
        let mut broadcaster = Broadcaster::new("/");
        let (conn, mut outbox) = connect(&mut broadcaster);

        let routed = route(&mut broadcaster, &conn, r#"{"type":"wave","roomID":"R1"}"#);

        assert_eq!(routed, Routed::Ignored(Some("wave".to_string())));
        assert!(drain(&mut outbox).is_empty());
    }

    #[test]
    fn test_routes_join_and_leave() {
        let mut broadcaster = Broadcaster::new("/");
        let (alice, mut alice_outbox) = connect(&mut broadcaster);

        assert_eq!(
            join(&mut broadcaster, &alice, "R1", "alice"),
            Routed::Handled(MessageKind::JoinRoom)
        );
        assert_eq!(
            drain(&mut alice_outbox),
            vec![json!({"type": "join-room", "user": "alice"})]
        );

        let routed = route(
            &mut broadcaster,
            &alice,
            r#"{"type":"leave-room","roomID":"R1","user":"alice"}"#,
        );
        assert_eq!(routed, Routed::Handled(MessageKind::LeaveRoom));
        assert!(!broadcaster.rooms().contains("R1"));
    }

    #[test]
    fn test_routes_chat_including_sender() {
        let mut broadcaster = Broadcaster::new("/");
        let (alice, mut alice_outbox) = connect(&mut broadcaster);
        let (bob, mut bob_outbox) = connect(&mut broadcaster);
        join(&mut broadcaster, &alice, "R1", "alice");
        join(&mut broadcaster, &bob, "R1", "bob");
        drain(&mut alice_outbox);
        drain(&mut bob_outbox);

        let routed = route(
            &mut broadcaster,
            &bob,
            r#"{"type":"chat-message","roomID":"R1","message":"hi","sender":"bob"}"#,
        );

        assert_eq!(routed, Routed::Handled(MessageKind::ChatMessage));
        let expected = vec![json!({
            "type": "chat-message",
            "message": "hi",
            "roomID": "R1",
            "sender": "bob"
        })];
        assert_eq!(drain(&mut alice_outbox), expected);
        assert_eq!(drain(&mut bob_outbox), expected);
    }

    #[test]
    fn test_routes_voice_result_to_peer_only() {
        let mut broadcaster = Broadcaster::new("/");
        let (alice, mut alice_outbox) = connect(&mut broadcaster);
        let (bob, mut bob_outbox) = connect(&mut broadcaster);
        join(&mut broadcaster, &alice, "R1", "alice");
        join(&mut broadcaster, &bob, "R1", "bob");
        drain(&mut alice_outbox);
        drain(&mut bob_outbox);

        let raw = r#"{"type":"voice-recognition-result","roomID":"R1","transcript":"cough","final":true}"#;
        let routed = route(&mut broadcaster, &alice, raw);

        assert_eq!(routed, Routed::Handled(MessageKind::VoiceRecognitionResult));
        assert!(drain(&mut alice_outbox).is_empty());
        assert_eq!(bob_outbox.try_recv().as_deref(), Some(raw));
    }

    #[test]
    fn test_routes_notification_globally() {
        let mut broadcaster = Broadcaster::new("/");
        let (admin, mut admin_outbox) = connect(&mut broadcaster);
        let (_patient, mut patient_outbox) = connect(&mut broadcaster);

        let routed = route(
            &mut broadcaster,
            &admin,
            r#"{"type":"notification","message":{"id":9},"date":"2024-05-01T10:00:00Z"}"#,
        );

        assert_eq!(routed, Routed::Handled(MessageKind::Notification));
        let expected = vec![json!({
            "type": "notification",
            "message": {"id": 9},
            "date": "2024-05-01T10:00:00Z"
        })];
        // the sender is a registered connection too
        assert_eq!(drain(&mut admin_outbox), expected);
        assert_eq!(drain(&mut patient_outbox), expected);
    }

    #[test]
    fn test_operations_on_missing_room_are_silent() {
        let mut broadcaster = Broadcaster::new("/");
        let (conn, mut outbox) = connect(&mut broadcaster);

        for frame in [
            r#"{"type":"leave-room","roomID":"ghost","user":"bob"}"#,
            r#"{"type":"stop-session","roomID":"ghost"}"#,
            r#"{"type":"offer","roomID":"ghost","sdp":"v=0"}"#,
            r#"{"type":"chat-message","roomID":"ghost","message":"x","sender":"bob"}"#,
        ] {
            assert!(matches!(
                route(&mut broadcaster, &conn, frame),
                Routed::Handled(_)
            ));
        }
        assert!(drain(&mut outbox).is_empty());
        assert!(broadcaster.rooms().is_empty());
    }
}
