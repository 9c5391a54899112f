use adieu_client::{ClientEvent, CloseReason};
use adieu_core::{ClientMessage, ConnectionId};

use crate::integration::init_tracing;
use crate::utils::{ClientHarness, EVENT_TIMEOUT_MS, MockConnectionFactory, TransportCall, is_offer_to};

#[tokio::test]
async fn test_leave_call_is_idempotent() {
    init_tracing();

    let factory = MockConnectionFactory::new();
    let mut client = ClientHarness::start("Host", factory.clone()).await.unwrap();
    let guest = ConnectionId::new();

    client.join_call("E1", true).await.unwrap();
    client.remote_joins_live("E1", guest, "Guest");
    client.next_outbound_matching(is_offer_to(guest)).await.unwrap();

    client.handle.leave_call().unwrap();
    client.handle.leave_call().unwrap();

    let removed = client
        .wait_event(|e| matches!(e, ClientEvent::TileRemoved { .. }))
        .await
        .unwrap();
    assert!(matches!(
        removed,
        ClientEvent::TileRemoved { connection_id, reason: CloseReason::Requested } if connection_id == guest
    ));

    let left = client
        .next_outbound_matching(|m| matches!(m, ClientMessage::LeaveLive { .. }))
        .await
        .unwrap();
    assert!(matches!(left, ClientMessage::LeaveLive { room_id } if room_id.as_str() == "E1"));
    assert!(
        client
            .sends_no(200, |m| matches!(m, ClientMessage::LeaveLive { .. }))
            .await
    );

    let spy = factory.wait_for_transport(guest, EVENT_TIMEOUT_MS).await.unwrap();
    assert!(spy.wait_for_call(&TransportCall::Close, EVENT_TIMEOUT_MS).await);
    assert!(client.handle.sessions().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_leave_without_call_is_silent() {
    init_tracing();

    let mut client = ClientHarness::start("Guest", MockConnectionFactory::new())
        .await
        .unwrap();

    client.handle.leave_call().unwrap();
    assert!(client.sends_no(200, |_| true).await);
}
