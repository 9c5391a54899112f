use adieu_core::{ClientMessage, ConnectionId, PeerInfo, RoomId, ServerMessage};

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{count_ops, flush, join_room, send_as};

#[tokio::test]
async fn test_leave_room_rebroadcasts_to_remaining() {
    init_tracing();

    let (relay, signaling) = create_test_relay();
    let room = RoomId::from("E1");
    let host = ConnectionId::new();
    let guest = ConnectionId::new();

    send_as(&relay, host, join_room("E1", "Host")).await;
    send_as(&relay, guest, join_room("E1", "Guest")).await;
    flush(&relay, &room).await;
    signaling.clear();

    let leave = ClientMessage::LeaveRoom {
        room_id: room.clone(),
    };
    send_as(&relay, guest, leave.clone()).await;
    flush(&relay, &room).await;

    assert_eq!(
        signaling.messages_for(&host),
        vec![ServerMessage::RoomMembers {
            room_id: room.clone(),
            members: vec![PeerInfo::new(host, "Host")],
        }]
    );
    assert!(signaling.messages_for(&guest).is_empty());

    // A second leave is a no-op.
    send_as(&relay, guest, leave).await;
    flush(&relay, &room).await;
    assert_eq!(count_ops(&signaling.messages_for(&host), "roomMembers"), 1);
}

#[tokio::test]
async fn test_last_leave_drops_room() {
    init_tracing();

    let (relay, _signaling) = create_test_relay();
    let room = RoomId::from("E1");
    let peer = ConnectionId::new();

    send_as(&relay, peer, join_room("E1", "Solo")).await;
    assert!(flush(&relay, &room).await.is_some());

    send_as(
        &relay,
        peer,
        ClientMessage::LeaveRoom {
            room_id: room.clone(),
        },
    )
    .await;
    assert!(flush(&relay, &room).await.is_none());
}
