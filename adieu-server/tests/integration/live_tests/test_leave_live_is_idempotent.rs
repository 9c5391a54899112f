use adieu_core::{ConnectionId, RoomId, ServerMessage};

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{count_ops, flush, join_live, leave_live, send_as};

#[tokio::test]
async fn test_leave_live_is_idempotent() {
    init_tracing();

    let (relay, signaling) = create_test_relay();
    let room = RoomId::from("E1");
    let host = ConnectionId::new();
    let guest = ConnectionId::new();

    send_as(&relay, host, join_live("E1", "Host", true)).await;
    send_as(&relay, guest, join_live("E1", "Guest", false)).await;
    flush(&relay, &room).await;
    signaling.clear();

    send_as(&relay, guest, leave_live("E1")).await;
    let once = flush(&relay, &room).await.expect("host is still live");
    send_as(&relay, guest, leave_live("E1")).await;
    let twice = flush(&relay, &room).await.expect("host is still live");

    assert_eq!(once, twice);
    assert_eq!(twice.live_ids(), vec![host]);
    assert_eq!(
        signaling.messages_for(&host),
        vec![ServerMessage::UserLeftLive {
            room_id: room.clone(),
            connection_id: guest,
        }]
    );
    assert_eq!(count_ops(&signaling.messages_for(&guest), "userLeftLive"), 0);
}

#[tokio::test]
async fn test_leave_live_of_unknown_room_is_ignored() {
    init_tracing();

    let (relay, signaling) = create_test_relay();
    let peer = ConnectionId::new();

    send_as(&relay, peer, leave_live("nowhere")).await;
    assert!(flush(&relay, &RoomId::from("nowhere")).await.is_none());
    assert!(signaling.all().is_empty());
}
