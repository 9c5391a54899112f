use adieu_client::{ClientEvent, NegotiationState};
use adieu_core::RoomId;
use std::time::Duration;

use super::{connect, wait_for};
use crate::integration::{init_tracing, start_test_relay};
use crate::utils::{EVENT_TIMEOUT_MS, TransportCall};

#[tokio::test]
async fn test_host_offers_when_guest_goes_live() {
    init_tracing();

    let (addr, state) = start_test_relay().await;
    let room = RoomId::from("E1");

    let mut host = connect(addr, "Host").await;
    let host_id = host.handle.connection_id().await.unwrap().unwrap();
    host.handle.join_room("E1").unwrap();
    host.handle.join_call("E1", true).await.unwrap();

    // The host must be on stage before the guest arrives.
    let mut host_live = false;
    for _ in 0..(EVENT_TIMEOUT_MS / 10) {
        let snapshot = state.relay.inspect(&room).await.unwrap();
        if snapshot.is_some_and(|s| s.live_ids() == vec![host_id]) {
            host_live = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(host_live, "host never went live");

    let mut guest = connect(addr, "Guest").await;
    let guest_id = guest.handle.connection_id().await.unwrap().unwrap();
    guest.handle.join_room("E1").unwrap();
    guest.handle.join_call("E1", false).await.unwrap();

    let joined = wait_for(&mut host.events, |e| {
        matches!(e, ClientEvent::ParticipantJoinedLive { .. })
    })
    .await;
    assert!(matches!(
        joined,
        ClientEvent::ParticipantJoinedLive { connection_id, ref display_name, is_host: false, .. }
            if connection_id == guest_id && display_name == "Guest"
    ));

    let is_connected = |e: &ClientEvent| {
        matches!(
            e,
            ClientEvent::SessionStateChanged { state: NegotiationState::Connected, .. }
        )
    };
    wait_for(&mut host.events, is_connected).await;
    wait_for(&mut guest.events, is_connected).await;

    // The side that saw the other join is the one that offered.
    let host_side = host.factory.wait_for_transport(guest_id, EVENT_TIMEOUT_MS).await.unwrap();
    let guest_side = guest.factory.wait_for_transport(host_id, EVENT_TIMEOUT_MS).await.unwrap();
    assert!(host_side.calls().await.contains(&TransportCall::CreateOffer));
    assert!(guest_side.calls().await.contains(&TransportCall::CreateAnswer));
    assert!(!guest_side.calls().await.contains(&TransportCall::CreateOffer));

    let guest_tiles = guest.handle.sessions().await.unwrap();
    assert_eq!(guest_tiles.len(), 1);
    assert_eq!(guest_tiles[0].display_name, "Host");

    guest.handle.leave_call().unwrap();
    let removed = wait_for(&mut host.events, |e| {
        matches!(e, ClientEvent::TileRemoved { .. })
    })
    .await;
    assert!(matches!(
        removed,
        ClientEvent::TileRemoved { connection_id, .. } if connection_id == guest_id
    ));
    assert!(host.handle.sessions().await.unwrap().is_empty());
}
