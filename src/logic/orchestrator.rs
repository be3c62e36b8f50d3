//! Tournament-level lifecycle: registration, check-in, start, advancement.
//!
//! `Open -> CheckIn -> Active -> Completed`, with `Cancelled` reachable from
//! any pre-`Completed` phase. Advancement past `Active` is implicit: it is
//! driven by match completions, never by an explicit admin call.

use crate::error::EngineError;
use crate::logic::{bracket, groups};
use crate::models::{
    MatchId, MatchStatus, Participant, TeamSelection, Tournament, TournamentFormat,
    TournamentStatus, UserId,
};

/// Upper bound on tournament capacity. Keeps the number of match records a
/// single tournament can materialize bounded.
pub const MAX_CAPACITY: u32 = 1024;

/// Validate the requested capacity and build a new tournament record.
pub fn create_tournament(
    title: impl Into<String>,
    format: TournamentFormat,
    max_participants: u32,
    organizer: UserId,
) -> Result<Tournament, EngineError> {
    if max_participants < 2 || max_participants > MAX_CAPACITY {
        return Err(EngineError::InvalidCapacity {
            requested: max_participants,
            limit: MAX_CAPACITY,
        });
    }
    Ok(Tournament::new(title, format, max_participants, organizer))
}

/// Register a user with their selected team. Open phase only.
///
/// Capacity and team-name uniqueness (case-insensitive) are checked here,
/// under the caller's tournament lock, so two simultaneous joins of the same
/// team cannot both succeed.
pub fn join_tournament(
    tournament: &mut Tournament,
    user_id: UserId,
    team: TeamSelection,
) -> Result<(), EngineError> {
    if tournament.status != TournamentStatus::Open {
        return Err(EngineError::TournamentState(tournament.status));
    }
    if tournament.participant(user_id).is_some() {
        return Err(EngineError::AlreadyJoined);
    }
    if tournament.participants.len() >= tournament.max_participants as usize {
        return Err(EngineError::TournamentFull {
            max: tournament.max_participants,
        });
    }
    let name = team.name.trim();
    if name.is_empty() {
        return Err(EngineError::EmptyTeamName);
    }
    if tournament.is_team_taken(name) {
        return Err(EngineError::TeamTaken(name.to_string()));
    }
    tournament.participants.push(Participant::new(
        user_id,
        TeamSelection {
            name: name.to_string(),
            logo: team.logo,
        },
    ));
    Ok(())
}

/// Withdraw before registration closes. Open phase only.
pub fn leave_tournament(tournament: &mut Tournament, user_id: UserId) -> Result<(), EngineError> {
    if tournament.status != TournamentStatus::Open {
        return Err(EngineError::TournamentState(tournament.status));
    }
    if tournament.participant(user_id).is_none() {
        return Err(EngineError::ParticipantNotFound);
    }
    tournament.participants.retain(|p| p.user_id != user_id);
    Ok(())
}

/// Close registration and open the check-in window: `Open -> CheckIn`.
pub fn begin_check_in(tournament: &mut Tournament, admin: UserId) -> Result<(), EngineError> {
    if !tournament.is_admin(admin) {
        return Err(EngineError::NotAdmin);
    }
    if tournament.status != TournamentStatus::Open {
        return Err(EngineError::TournamentState(tournament.status));
    }
    tournament.status = TournamentStatus::CheckIn;
    Ok(())
}

/// A joined participant confirms attendance. CheckIn phase only.
pub fn check_in(tournament: &mut Tournament, user_id: UserId) -> Result<(), EngineError> {
    if tournament.status != TournamentStatus::CheckIn {
        return Err(EngineError::TournamentState(tournament.status));
    }
    let participant = tournament
        .participant_mut(user_id)
        .ok_or(EngineError::NotAParticipant)?;
    participant.is_checked_in = true;
    Ok(())
}

/// Materialize all match records and go `Active`. Valid from Open or
/// CheckIn; when starting out of CheckIn, only checked-in participants are
/// seeded.
pub fn start_tournament(tournament: &mut Tournament, admin: UserId) -> Result<(), EngineError> {
    if !tournament.is_admin(admin) {
        return Err(EngineError::NotAdmin);
    }
    if !matches!(
        tournament.status,
        TournamentStatus::Open | TournamentStatus::CheckIn
    ) {
        return Err(EngineError::TournamentState(tournament.status));
    }

    let seeds: Vec<UserId> = tournament
        .participants
        .iter()
        .filter(|p| tournament.status == TournamentStatus::Open || p.is_checked_in)
        .map(|p| p.user_id)
        .collect();
    if seeds.len() < 2 {
        return Err(EngineError::NotEnoughParticipants {
            required: 2,
            actual: seeds.len(),
        });
    }

    match tournament.format {
        TournamentFormat::Knockout => {
            let size = bracket::bracket_size(tournament.max_participants);
            bracket::append_knockout_matches(tournament, &seeds, size);
        }
        TournamentFormat::League => {
            groups::append_round_robin(tournament, &seeds, None);
        }
        TournamentFormat::Hybrid => {
            let settings = tournament
                .group_settings
                .ok_or(EngineError::MissingGroupSettings)?;
            groups::append_group_matches(tournament, &seeds, settings);
        }
    }

    tournament.status = TournamentStatus::Active;
    Ok(())
}

/// Cancel the tournament from any pre-Completed phase. All unresolved
/// matches are cancelled with it.
pub fn cancel_tournament(tournament: &mut Tournament, admin: UserId) -> Result<(), EngineError> {
    if !tournament.is_admin(admin) {
        return Err(EngineError::NotAdmin);
    }
    if matches!(
        tournament.status,
        TournamentStatus::Completed | TournamentStatus::Cancelled
    ) {
        return Err(EngineError::TournamentState(tournament.status));
    }
    for game in tournament.matches.iter_mut() {
        if !game.is_resolved() {
            game.status = MatchStatus::Cancelled;
        }
    }
    tournament.status = TournamentStatus::Cancelled;
    Ok(())
}

/// React to a match reaching a terminal status: propagate knockout winners,
/// hand the group stage over to the knockout bracket, and complete the
/// tournament once nothing is left to play.
pub(crate) fn handle_match_resolved(tournament: &mut Tournament, match_id: MatchId) {
    let knockout_slot = tournament
        .match_by_id(match_id)
        .filter(|g| g.round >= 1)
        .map(|g| (g.round, g.match_index));
    if let Some((round, index)) = knockout_slot {
        bracket::propagate_result(tournament, round, index);
    }

    if tournament.format == TournamentFormat::Hybrid {
        maybe_generate_hybrid_knockout(tournament);
    }

    let all_resolved =
        !tournament.matches.is_empty() && tournament.matches.iter().all(|m| m.is_resolved());
    let knockout_pending =
        tournament.format == TournamentFormat::Hybrid && tournament.knockout_rounds() == 0;
    if all_resolved && !knockout_pending && tournament.status == TournamentStatus::Active {
        tournament.status = TournamentStatus::Completed;
    }
}

/// Once every group match is resolved, seed and generate the knockout
/// bracket from the qualifiers. Runs at most once per tournament.
fn maybe_generate_hybrid_knockout(tournament: &mut Tournament) {
    if tournament.knockout_rounds() > 0 {
        return;
    }
    let group_stage_done = tournament
        .matches
        .iter()
        .filter(|m| m.round == 0)
        .all(|m| m.is_resolved());
    if !group_stage_done || tournament.matches.is_empty() {
        return;
    }
    let per_group = groups::qualifiers_per_group(tournament);
    let seeds = knockout_seed_order(&per_group);
    if seeds.len() < 2 {
        return;
    }
    let size = bracket::bracket_size(seeds.len() as u32);
    bracket::append_knockout_matches(tournament, &seeds, size);
}

/// Cross-group seeding policy for the knockout round.
///
/// With two qualifiers per group and a full bracket, group g's winner meets
/// group (g+1 mod G)'s runner-up. Otherwise qualifiers are ordered by rank
/// within group, then group index, so byes (if any) go to the best-ranked
/// and pairing follows seed order.
fn knockout_seed_order(per_group: &[Vec<UserId>]) -> Vec<UserId> {
    let g = per_group.len();
    let two_each = g >= 2 && per_group.iter().all(|q| q.len() == 2);
    let total: usize = per_group.iter().map(|q| q.len()).sum();
    if two_each && total.is_power_of_two() {
        let mut seeds = Vec::with_capacity(total);
        for i in 0..g {
            seeds.push(per_group[i][0]);
            seeds.push(per_group[(i + 1) % g][1]);
        }
        return seeds;
    }
    let max_rank = per_group.iter().map(|q| q.len()).max().unwrap_or(0);
    let mut seeds = Vec::with_capacity(total);
    for rank in 0..max_rank {
        for group in per_group {
            if let Some(&user) = group.get(rank) {
                seeds.push(user);
            }
        }
    }
    seeds
}
