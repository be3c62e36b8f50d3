//! Tournament engine web app: library with models and business logic.

pub mod error;
pub mod logic;
pub mod models;
pub mod realtime;

pub use error::{EngineError, ErrorKind};
pub use logic::{
    admin_resolve, append_chat_message, append_group_matches, append_knockout_matches,
    append_round_robin, begin_check_in, begin_match, bracket_rounds, bracket_size, cancel_match,
    cancel_tournament, check_in, confirm_result, create_tournament, group_standings, group_tables,
    join_tournament, league_overview, league_table, leave_tournament, participant_fixtures,
    qualifiers_per_group, reject_result, start_tournament, submit_result, MAX_CAPACITY,
};
pub use models::{
    round_name, BiggestWin, BracketRound, ChatMessage, GameMatch, GroupSettings, GroupTable,
    LeagueOverview, MatchId, MatchStatus, Participant, StandingRow, TeamSelection, Tournament,
    TournamentFormat, TournamentId, TournamentRules, TournamentStatus, UserId,
};
pub use realtime::{EngineEvent, EventBus};
