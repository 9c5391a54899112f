use adieu_client::ClientEvent;

use super::{connect, wait_for};
use crate::integration::{init_tracing, start_test_relay};

#[tokio::test]
async fn test_chat_and_reactions_reach_every_member() {
    init_tracing();

    let (addr, _state) = start_test_relay().await;
    let mut host = connect(addr, "Host").await;
    let mut guest = connect(addr, "Guest").await;

    host.handle.join_room("E1").unwrap();
    guest.handle.join_room("E1").unwrap();

    wait_for(&mut host.events, |e| {
        matches!(e, ClientEvent::Members { members, .. } if members.len() == 2)
    })
    .await;

    host.handle.send_chat("E1", "hello grandma").unwrap();
    let chat = wait_for(&mut guest.events, |e| matches!(e, ClientEvent::Chat(_))).await;
    assert!(matches!(
        chat,
        ClientEvent::Chat(m) if m.author == "Host" && m.text == "hello grandma"
    ));

    guest.handle.send_reaction("E1", "❤️").unwrap();
    for client in [&mut host, &mut guest] {
        let reaction =
            wait_for(&mut client.events, |e| matches!(e, ClientEvent::Reaction { .. })).await;
        assert!(matches!(reaction, ClientEvent::Reaction { emoji, .. } if emoji == "❤️"));
    }
}
