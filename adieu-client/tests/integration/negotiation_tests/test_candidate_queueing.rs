use adieu_core::{ConnectionId, IceCandidate, SdpKind, ServerMessage};

use crate::integration::init_tracing;
use crate::utils::{ClientHarness, EVENT_TIMEOUT_MS, MockConnectionFactory, TransportCall, is_offer_to};

#[tokio::test]
async fn test_early_candidates_apply_in_order() {
    init_tracing();

    let factory = MockConnectionFactory::stalled();
    let mut host = ClientHarness::start("Host", factory.clone()).await.unwrap();
    let guest = ConnectionId::new();

    host.join_call("E1", true).await.unwrap();
    host.remote_joins_live("E1", guest, "Guest");
    host.next_outbound_matching(is_offer_to(guest)).await.unwrap();

    // Candidates overtake the answer.
    for c in ["c1", "c2"] {
        host.deliver(ServerMessage::Candidate {
            from_connection_id: guest,
            candidate: IceCandidate::new(c),
        });
    }
    host.remote_answers(guest);
    host.deliver(ServerMessage::Candidate {
        from_connection_id: guest,
        candidate: IceCandidate::new("c3"),
    });

    let spy = factory.wait_for_transport(guest, EVENT_TIMEOUT_MS).await.unwrap();
    assert!(
        spy
            .wait_for_call(&TransportCall::AddCandidate("c3".into()), EVENT_TIMEOUT_MS)
            .await
    );

    let after_offer: Vec<_> = spy.calls().await.into_iter().skip(2).collect();
    assert_eq!(
        after_offer,
        vec![
            TransportCall::SetRemote(SdpKind::Answer),
            TransportCall::AddCandidate("c1".into()),
            TransportCall::AddCandidate("c2".into()),
            TransportCall::AddCandidate("c3".into()),
        ]
    );
}
