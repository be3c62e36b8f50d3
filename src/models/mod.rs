//! Data structures for the tournament engine: tournaments, matches, standings.

mod matches;
mod standings;
mod tournament;

pub use matches::{round_name, ChatMessage, GameMatch, MatchId, MatchStatus, UserId};
pub use standings::{BiggestWin, BracketRound, GroupTable, LeagueOverview, StandingRow};
pub use tournament::{
    GroupSettings, Participant, TeamSelection, Tournament, TournamentFormat, TournamentId,
    TournamentRules, TournamentStatus,
};
