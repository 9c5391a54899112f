/// Lifecycle of one remote session.
///
/// `Idle -> Negotiating -> Connected`, with `Closed` reachable from every
/// state and final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NegotiationState {
    Idle,
    Negotiating,
    Connected,
    Closed,
}

impl NegotiationState {
    pub fn can_transition_to(self, next: NegotiationState) -> bool {
        use NegotiationState::*;

        matches!(
            (self, next),
            (Idle, Negotiating) | (Negotiating, Connected) | (Idle | Negotiating | Connected, Closed)
        )
    }

    pub fn is_closed(self) -> bool {
        self == NegotiationState::Closed
    }
}
