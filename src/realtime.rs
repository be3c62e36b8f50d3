//! Fire-and-forget push layer.
//!
//! Mutations publish named events; connected clients treat them purely as
//! cache-invalidation signals and re-fetch authoritative state. The payload
//! carries ids only, so nothing pushed is ever merged into client state and
//! no ordering guarantee is needed across the channel.

use crate::models::{MatchId, TournamentId, UserId};
use serde::Serialize;
use tokio::sync::broadcast;

/// A named mutation event, tagged for the wire as `{"type": "..."}`.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    MatchUpdated {
        tournament_id: TournamentId,
        match_id: MatchId,
    },
    TournamentUpdated {
        tournament_id: TournamentId,
    },
    TournamentParticipantJoined {
        tournament_id: TournamentId,
        user_id: UserId,
    },
}

impl EngineEvent {
    /// The tournament this event belongs to (used for per-tournament streams).
    pub fn tournament_id(&self) -> TournamentId {
        match self {
            EngineEvent::MatchUpdated { tournament_id, .. }
            | EngineEvent::TournamentUpdated { tournament_id }
            | EngineEvent::TournamentParticipantJoined { tournament_id, .. } => *tournament_id,
        }
    }
}

/// Broadcast bus for engine events. Publishing never blocks; slow or absent
/// subscribers lose events, which is fine because clients re-fetch anyway.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: EngineEvent) {
        // Err means no subscribers right now; nothing to do.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
