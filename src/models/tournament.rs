//! Tournament, Participant, and tournament-level configuration.

use crate::models::matches::{GameMatch, MatchId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Competitive structure of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    /// Single-elimination bracket.
    #[default]
    Knockout,
    /// One round-robin across the whole field.
    League,
    /// Group stage (round-robin within groups) feeding a knockout bracket.
    Hybrid,
}

/// Lifecycle phase of the tournament. Transitions are monotonic; `Cancelled`
/// is reachable from any pre-`Completed` phase.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Registration open; participants join and leave.
    #[default]
    Open,
    /// Registration closed; joined participants confirm attendance.
    CheckIn,
    /// Matches materialized; results being played and reconciled.
    Active,
    /// All matches completed or cancelled.
    Completed,
    Cancelled,
}

/// Group-stage configuration (hybrid) and point weights (hybrid/league).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupSettings {
    pub number_of_groups: u32,
    pub qualifiers_per_group: u32,
    pub points_win: i32,
    pub points_draw: i32,
    pub points_loss: i32,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            number_of_groups: 2,
            qualifiers_per_group: 2,
            points_win: 3,
            points_draw: 1,
            points_loss: 0,
        }
    }
}

/// Organizer-set rules; stored and echoed back, not interpreted by the engine.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentRules {
    pub team_category: Option<String>,
    pub specific_league: Option<String>,
    pub match_duration_minutes: u32,
}

/// The in-game team a participant registered with.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamSelection {
    pub name: String,
    pub logo: Option<String>,
}

/// A registered participant. Insertion order in `Tournament::participants`
/// is registration order and doubles as the default seeding order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: UserId,
    pub selected_team: TeamSelection,
    pub is_checked_in: bool,
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    pub fn new(user_id: UserId, selected_team: TeamSelection) -> Self {
        Self {
            user_id,
            selected_team,
            is_checked_in: false,
            joined_at: Utc::now(),
        }
    }
}

/// Full tournament state: configuration, participants, and match records.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub title: String,
    pub format: TournamentFormat,
    pub status: TournamentStatus,
    /// The admin who created the tournament; privileged operations check
    /// the acting user against this id.
    pub organizer: UserId,
    pub max_participants: u32,
    /// Required for hybrid; optional for league (custom point weights).
    pub group_settings: Option<GroupSettings>,
    pub participants: Vec<Participant>,
    pub matches: Vec<GameMatch>,
    pub prize_distribution: Vec<String>,
    pub entry_fee: u32,
    pub rules: TournamentRules,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a new tournament in Open state with no participants.
    pub fn new(
        title: impl Into<String>,
        format: TournamentFormat,
        max_participants: u32,
        organizer: UserId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            format,
            status: TournamentStatus::Open,
            organizer,
            max_participants,
            group_settings: None,
            participants: Vec::new(),
            matches: Vec::new(),
            prize_distribution: Vec::new(),
            entry_fee: 0,
            rules: TournamentRules::default(),
            created_at: Utc::now(),
        }
    }

    /// Whether this user holds admin rights over the tournament.
    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.organizer == user_id
    }

    pub fn participant(&self, user_id: UserId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }

    pub fn participant_mut(&mut self, user_id: UserId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.user_id == user_id)
    }

    /// Team names are unique per tournament, case-insensitive.
    pub fn is_team_taken(&self, team_name: &str) -> bool {
        self.participants
            .iter()
            .any(|p| p.selected_team.name.eq_ignore_ascii_case(team_name))
    }

    /// The registered team of a user, if they are a participant.
    pub fn team_of(&self, user_id: UserId) -> Option<&TeamSelection> {
        self.participant(user_id).map(|p| &p.selected_team)
    }

    pub fn match_by_id(&self, match_id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == match_id)
    }

    pub fn match_by_id_mut(&mut self, match_id: MatchId) -> Option<&mut GameMatch> {
        self.matches.iter_mut().find(|m| m.id == match_id)
    }

    /// Point weights for standings: configured values, or 3/1/0.
    pub fn point_weights(&self) -> (i32, i32, i32) {
        match &self.group_settings {
            Some(g) => (g.points_win, g.points_draw, g.points_loss),
            None => (3, 1, 0),
        }
    }

    /// Number of knockout rounds currently materialized (0 if none yet).
    pub fn knockout_rounds(&self) -> u32 {
        self.matches.iter().map(|m| m.round).max().unwrap_or(0)
    }

    /// Whether a match demands a single winner (draws not final): every
    /// knockout-stage match, i.e. any match with a 1-based round.
    pub fn requires_decisive_result(&self, game: &GameMatch) -> bool {
        game.round >= 1
    }
}
