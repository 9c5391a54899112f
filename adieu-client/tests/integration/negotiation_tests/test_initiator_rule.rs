use adieu_client::{ClientEvent, NegotiationState};
use adieu_core::{ClientMessage, ConnectionId, SdpKind};

use crate::integration::init_tracing;
use crate::utils::{ClientHarness, EVENT_TIMEOUT_MS, MockConnectionFactory, TransportCall, is_offer_to};

#[tokio::test]
async fn test_live_join_triggers_offer() {
    init_tracing();

    let factory = MockConnectionFactory::new();
    let mut host = ClientHarness::start("Host", factory.clone()).await.unwrap();
    let guest = ConnectionId::new();

    host.join_call("E1", true).await.unwrap();
    host.remote_joins_live("E1", guest, "Guest");

    let offer = host.next_outbound_matching(is_offer_to(guest)).await.unwrap();
    let ClientMessage::Offer {
        session_description,
        caller_display_name,
        ..
    } = offer
    else {
        unreachable!()
    };
    assert_eq!(session_description.kind, SdpKind::Offer);
    assert_eq!(caller_display_name, "Host");

    // Local candidates trickle to the same peer.
    let candidate = host
        .next_outbound_matching(|m| matches!(m, ClientMessage::Candidate { .. }))
        .await
        .unwrap();
    assert!(matches!(
        candidate,
        ClientMessage::Candidate { target_connection_id, .. } if target_connection_id == guest
    ));

    host.remote_answers(guest);
    host.wait_event(|e| {
        matches!(
            e,
            ClientEvent::SessionStateChanged { state: NegotiationState::Connected, .. }
        )
    })
    .await
    .unwrap();

    let spy = factory.wait_for_transport(guest, EVENT_TIMEOUT_MS).await.unwrap();
    assert_eq!(
        &spy.calls().await[..3],
        &[
            TransportCall::AddMedia,
            TransportCall::CreateOffer,
            TransportCall::SetRemote(SdpKind::Answer),
        ]
    );

    let sessions = host.handle.sessions().await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].display_name, "Guest");
    assert_eq!(sessions[0].state, NegotiationState::Connected);
}

#[tokio::test]
async fn test_duplicate_live_join_reuses_session() {
    init_tracing();

    let factory = MockConnectionFactory::new();
    let mut host = ClientHarness::start("Host", factory.clone()).await.unwrap();
    let guest = ConnectionId::new();

    host.join_call("E1", true).await.unwrap();
    host.remote_joins_live("E1", guest, "Guest");
    host.next_outbound_matching(is_offer_to(guest)).await.unwrap();

    host.remote_joins_live("E1", guest, "Guest");
    assert!(host.sends_no(200, is_offer_to(guest)).await);
    assert_eq!(factory.created().await, 1);
}

#[tokio::test]
async fn test_no_session_with_self() {
    init_tracing();

    let factory = MockConnectionFactory::new();
    let mut client = ClientHarness::start("Solo", factory.clone()).await.unwrap();
    let me = client.local_id;

    client.join_call("E1", true).await.unwrap();
    client.remote_joins_live("E1", me, "Solo");
    client.remote_offers(me, "Solo");

    assert!(client.sends_no(200, |_| true).await);
    assert_eq!(factory.created().await, 0);
    assert!(client.handle.sessions().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_live_join_in_other_room_is_ignored() {
    init_tracing();

    let factory = MockConnectionFactory::new();
    let mut client = ClientHarness::start("Host", factory.clone()).await.unwrap();

    client.join_call("E1", true).await.unwrap();
    client.remote_joins_live("E2", ConnectionId::new(), "Stranger");

    assert!(client.sends_no(200, |_| true).await);
    assert_eq!(factory.created().await, 0);
}
