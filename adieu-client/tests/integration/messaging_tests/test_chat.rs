use adieu_client::ClientEvent;
use adieu_core::{ChatMessage, ClientMessage, MessageId, RoomId, ServerMessage};

use crate::integration::init_tracing;
use crate::utils::{ClientHarness, MockConnectionFactory};

#[tokio::test]
async fn test_chat_is_sent_under_display_name() {
    init_tracing();

    let mut client = ClientHarness::start("Grandma", MockConnectionFactory::new())
        .await
        .unwrap();

    client.handle.join_room("E1").unwrap();
    client.handle.send_chat("E1", "   ").unwrap();
    client.handle.send_chat("E1", "hello").unwrap();

    assert_eq!(
        client.next_outbound().await.unwrap(),
        ClientMessage::JoinRoom {
            room_id: RoomId::from("E1"),
            display_name: "Grandma".into(),
        }
    );
    // The blank message never left the client.
    assert_eq!(
        client.next_outbound().await.unwrap(),
        ClientMessage::ChatMessage {
            room_id: RoomId::from("E1"),
            author: "Grandma".into(),
            text: "hello".into(),
        }
    );
}

#[tokio::test]
async fn test_relay_frames_become_events() {
    init_tracing();

    let mut client = ClientHarness::start("Guest", MockConnectionFactory::new())
        .await
        .unwrap();
    let message = ChatMessage {
        id: MessageId(7),
        room_id: RoomId::from("E1"),
        author: "Host".into(),
        text: "welcome".into(),
        timestamp: 1_700_000_000_000,
    };

    client.deliver(ServerMessage::Message(message.clone()));

    let event = client
        .wait_event(|e| matches!(e, ClientEvent::Chat(_)))
        .await
        .unwrap();
    assert!(matches!(event, ClientEvent::Chat(m) if m == message));
}
