//! Derived, read-only views: standings rows, league aggregates, bracket view.
//!
//! None of these are persisted; they are recomputed from the match set on
//! every query.

use crate::models::matches::{GameMatch, MatchId, UserId};
use serde::Serialize;

/// One row of a group or league table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct StandingRow {
    pub user_id: UserId,
    pub team_name: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: i32,
    /// Group stage only: inside the top `qualifiers_per_group` of its group.
    pub qualified: bool,
}

impl StandingRow {
    pub fn new(user_id: UserId, team_name: impl Into<String>) -> Self {
        Self {
            user_id,
            team_name: team_name.into(),
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
            qualified: false,
        }
    }
}

/// The standings of one group.
#[derive(Clone, Debug, Serialize)]
pub struct GroupTable {
    pub group_index: u32,
    pub rows: Vec<StandingRow>,
}

/// The single completed match with the largest goal differential.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BiggestWin {
    pub match_id: MatchId,
    pub winner: UserId,
    pub score_winner: u32,
    pub score_loser: u32,
    pub margin: u32,
}

/// Tournament-wide aggregates for drill-down views.
#[derive(Clone, Debug, Default, Serialize)]
pub struct LeagueOverview {
    /// Participant with the most goals scored.
    pub best_attack: Option<StandingRow>,
    /// Participant with the fewest goals conceded, among those with games played.
    pub best_defense: Option<StandingRow>,
    pub biggest_win: Option<BiggestWin>,
}

/// One knockout round with its display name, for bracket rendering.
#[derive(Clone, Debug, Serialize)]
pub struct BracketRound {
    pub round: u32,
    pub name: String,
    pub matches: Vec<GameMatch>,
}
