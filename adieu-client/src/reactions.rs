use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveReaction {
    pub id: String,
    pub emoji: String,
    pub received_at: Instant,
}

/// Reactions currently on screen, oldest first.
///
/// Each one stays for `ttl` after it was received; ids come from the relay.
#[derive(Debug)]
pub struct ReactionFeed {
    ttl: Duration,
    active: VecDeque<ActiveReaction>,
}

impl ReactionFeed {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            active: VecDeque::new(),
        }
    }

    pub fn push(&mut self, id: String, emoji: String, now: Instant) {
        self.active.push_back(ActiveReaction {
            id,
            emoji,
            received_at: now,
        });
    }

    /// Drops expired reactions and returns their ids.
    pub fn prune(&mut self, now: Instant) -> Vec<String> {
        let mut expired = Vec::new();
        while let Some(front) = self.active.front() {
            if now.duration_since(front.received_at) < self.ttl {
                break;
            }
            if let Some(reaction) = self.active.pop_front() {
                expired.push(reaction.id);
            }
        }
        expired
    }

    pub fn active(&self) -> impl Iterator<Item = &ActiveReaction> {
        self.active.iter()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
