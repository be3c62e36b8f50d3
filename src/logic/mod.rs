//! Tournament business logic: brackets, groups, standings, match flow.

pub mod bracket;
pub mod groups;
pub mod league;
pub mod match_flow;
pub mod orchestrator;

pub use bracket::{append_knockout_matches, bracket_rounds, bracket_size};
pub use groups::{
    allocate_groups, append_group_matches, append_round_robin, group_standings, group_tables,
    qualifiers_per_group,
};
pub use league::{league_overview, league_table, participant_fixtures};
pub use match_flow::{
    admin_resolve, append_chat_message, begin_match, cancel_match, confirm_result, reject_result,
    submit_result,
};
pub use orchestrator::{
    begin_check_in, cancel_tournament, check_in, create_tournament, join_tournament,
    leave_tournament, start_tournament, MAX_CAPACITY,
};
