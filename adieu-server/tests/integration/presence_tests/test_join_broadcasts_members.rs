use adieu_core::{ConnectionId, PeerInfo, RoomId, ServerMessage};

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{flush, join_room, send_as};

#[tokio::test]
async fn test_join_broadcasts_members() {
    init_tracing();

    let (relay, signaling) = create_test_relay();
    let room = RoomId::from("E1");
    let host = ConnectionId::new();
    let guest = ConnectionId::new();

    send_as(&relay, host, join_room("E1", "Host")).await;
    send_as(&relay, guest, join_room("E1", "Guest")).await;
    flush(&relay, &room).await;

    let expected = ServerMessage::RoomMembers {
        room_id: room.clone(),
        members: vec![PeerInfo::new(host, "Host"), PeerInfo::new(guest, "Guest")],
    };

    // The joiner receives the list too.
    assert_eq!(signaling.messages_for(&guest), vec![expected.clone()]);
    assert_eq!(signaling.messages_for(&host).last(), Some(&expected));
    assert_eq!(signaling.messages_for(&host).len(), 2);
}

#[tokio::test]
async fn test_rejoin_does_not_duplicate_member() {
    init_tracing();

    let (relay, signaling) = create_test_relay();
    let room = RoomId::from("E1");
    let peer = ConnectionId::new();

    send_as(&relay, peer, join_room("E1", "Ann")).await;
    send_as(&relay, peer, join_room("E1", "Ann")).await;
    let snapshot = flush(&relay, &room).await.expect("room exists");

    assert_eq!(snapshot.member_ids(), vec![peer]);
    let Some(ServerMessage::RoomMembers { members, .. }) = signaling.messages_for(&peer).pop()
    else {
        panic!("expected a member list");
    };
    assert_eq!(members.len(), 1);
}
