//! Match record, match status, and per-match chat.

use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Opaque reference to a user supplied by the identity collaborator.
pub type UserId = Uuid;

/// Lifecycle of a single match.
///
/// `Scheduled -> Ongoing -> Review -> Completed`, with an alternate
/// `Review -> Dispute -> Completed` path (admin arbitration) and a terminal
/// `Cancelled` reachable from `Scheduled`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Ongoing,
    /// A result was submitted; waiting for the opponent to confirm or reject.
    Review,
    Completed,
    /// The opponent rejected the submitted result; waiting for an admin.
    Dispute,
    Cancelled,
}

/// One message in a match's communication channel. Append-only.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender_id: UserId,
    pub sender_name: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// A single match between two participants.
///
/// `player1`/`player2` are `None` for bye slots and for knockout placeholders
/// whose feeders have not completed yet.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    /// 0 for group/league-stage matches, 1-based for knockout rounds.
    pub round: u32,
    /// Position within the round (knockout) or within the group schedule.
    pub match_index: u32,
    /// Set only for group-stage matches.
    pub group_index: Option<u32>,
    pub player1: Option<UserId>,
    pub player2: Option<UserId>,
    pub player1_team: Option<String>,
    pub player1_logo: Option<String>,
    pub player2_team: Option<String>,
    pub player2_logo: Option<String>,
    pub status: MatchStatus,
    pub score_player1: Option<u32>,
    pub score_player2: Option<u32>,
    /// Populated only when regulation ended level and the match required a
    /// decisive outcome.
    pub penalties_player1: Option<u32>,
    pub penalties_player2: Option<u32>,
    pub submitted_by: Option<UserId>,
    /// Opaque URI from the proof-storage collaborator.
    pub proof_screenshot: Option<String>,
    pub winner: Option<UserId>,
    pub is_bye: bool,
    /// Set when an admin resolved a dispute; the UI shows a badge and the
    /// submitted scores are kept for audit only.
    pub admin_decision: bool,
    pub chat_messages: Vec<ChatMessage>,
}

impl GameMatch {
    pub fn new(
        tournament_id: TournamentId,
        round: u32,
        match_index: u32,
        group_index: Option<u32>,
        player1: Option<UserId>,
        player2: Option<UserId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round,
            match_index,
            group_index,
            player1,
            player2,
            player1_team: None,
            player1_logo: None,
            player2_team: None,
            player2_logo: None,
            status: MatchStatus::Scheduled,
            score_player1: None,
            score_player2: None,
            penalties_player1: None,
            penalties_player2: None,
            submitted_by: None,
            proof_screenshot: None,
            winner: None,
            is_bye: false,
            admin_decision: false,
            chat_messages: Vec::new(),
        }
    }

    /// Whether the user occupies one of the two player slots.
    pub fn involves(&self, user_id: UserId) -> bool {
        self.player1 == Some(user_id) || self.player2 == Some(user_id)
    }

    /// The opponent of `user_id`, if both slots are known.
    pub fn opponent_of(&self, user_id: UserId) -> Option<UserId> {
        if self.player1 == Some(user_id) {
            self.player2
        } else if self.player2 == Some(user_id) {
            self.player1
        } else {
            None
        }
    }

    /// Terminal statuses: the match can no longer change result.
    pub fn is_resolved(&self) -> bool {
        matches!(self.status, MatchStatus::Completed | MatchStatus::Cancelled)
    }

    /// Decide the winner from the recorded scores: regulation score first,
    /// penalties on a level score. `None` means a draw stands (league/group)
    /// or scores are missing.
    pub fn decide_winner(&self) -> Option<UserId> {
        let (s1, s2) = (self.score_player1?, self.score_player2?);
        if s1 > s2 {
            return self.player1;
        }
        if s2 > s1 {
            return self.player2;
        }
        match (self.penalties_player1, self.penalties_player2) {
            (Some(p1), Some(p2)) if p1 > p2 => self.player1,
            (Some(p1), Some(p2)) if p2 > p1 => self.player2,
            _ => None,
        }
    }
}

/// Display name for a knockout round: counted back from the final.
/// `total_rounds - round`: 0 -> Final, 1 -> Semifinal, 2 -> Quarterfinal,
/// else "Round of 2^(diff+1)".
pub fn round_name(total_rounds: u32, round: u32) -> String {
    match total_rounds.saturating_sub(round) {
        0 => "Final".to_string(),
        1 => "Semifinal".to_string(),
        2 => "Quarterfinal".to_string(),
        diff => format!("Round of {}", 2u64.pow(diff + 1)),
    }
}
