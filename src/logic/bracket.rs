//! Single-elimination bracket: generation, bye handling, winner propagation.

use crate::models::{round_name, BracketRound, GameMatch, MatchStatus, Tournament, UserId};

/// Smallest power-of-two bracket that fits `slots` participants (minimum 2).
/// Saturates at the largest `u32` power of two; capacity validation at
/// tournament creation keeps real inputs far below that.
pub fn bracket_size(slots: u32) -> u32 {
    slots
        .max(2)
        .checked_next_power_of_two()
        .unwrap_or(1 << 31)
}

/// Generate and append all knockout rounds for the given seeds.
///
/// Round 1 has exactly `size / 2` matches. With N seeds and B = size - N
/// missing slots, the first `min(B, N)` seeds each occupy a bye match
/// (auto-completed), the remaining seeds pair sequentially, and any match
/// left with both slots empty is cancelled at generation. Rounds 2.. are
/// scheduled placeholders filled as feeders complete.
pub fn append_knockout_matches(tournament: &mut Tournament, seeds: &[UserId], size: u32) {
    let total_rounds = size.trailing_zeros();
    let first_round_matches = size / 2;
    let byes = (size as usize).saturating_sub(seeds.len());
    let bye_count = byes.min(seeds.len()) as u32;

    let mut remaining = seeds.iter().copied();
    for index in 0..first_round_matches {
        let mut game = if index < bye_count {
            let player = remaining.next();
            let mut m = GameMatch::new(tournament.id, 1, index, None, player, None);
            m.is_bye = true;
            m.status = MatchStatus::Completed;
            m.winner = player;
            m
        } else {
            let p1 = remaining.next();
            let p2 = remaining.next();
            let mut m = GameMatch::new(tournament.id, 1, index, None, p1, p2);
            match (p1, p2) {
                (Some(_), Some(_)) => {}
                (Some(only), None) | (None, Some(only)) => {
                    m.is_bye = true;
                    m.status = MatchStatus::Completed;
                    m.winner = Some(only);
                }
                (None, None) => m.status = MatchStatus::Cancelled,
            }
            m
        };
        stamp_teams(tournament, &mut game);
        tournament.matches.push(game);
    }

    for round in 2..=total_rounds {
        for index in 0..(size >> round) {
            let game = GameMatch::new(tournament.id, round, index, None, None, None);
            tournament.matches.push(game);
        }
    }

    // Push round-1 byes and cancellations forward into the placeholders.
    for index in 0..first_round_matches {
        let resolved = tournament
            .matches
            .iter()
            .any(|m| m.round == 1 && m.match_index == index && m.is_resolved());
        if resolved {
            propagate_result(tournament, 1, index);
        }
    }
}

/// Copy the registered team name/logo of each occupied slot onto the match.
fn stamp_teams(tournament: &Tournament, game: &mut GameMatch) {
    if let Some(team) = game.player1.and_then(|p| tournament.team_of(p)) {
        game.player1_team = Some(team.name.clone());
        game.player1_logo = team.logo.clone();
    }
    if let Some(team) = game.player2.and_then(|p| tournament.team_of(p)) {
        game.player2_team = Some(team.name.clone());
        game.player2_logo = team.logo.clone();
    }
}

/// Propagate the outcome of knockout match (`round`, `match_index`) into the
/// next round's placeholder.
///
/// The winner of round r match i fills round r+1 match i/2, slot by parity
/// of i. Once both feeders of a placeholder are resolved: two winners leave
/// it a scheduled pairing, one winner turns it into a bye, none cancels it;
/// byes and cancellations recurse forward.
pub(crate) fn propagate_result(tournament: &mut Tournament, round: u32, match_index: u32) {
    let next_round = round + 1;
    let next_index = match_index / 2;
    let feeder = |t: &Tournament, idx: u32| -> Option<(bool, Option<UserId>)> {
        t.matches
            .iter()
            .find(|m| m.round == round && m.match_index == idx)
            .map(|m| (m.is_resolved(), m.winner))
    };
    let left = feeder(tournament, next_index * 2).unwrap_or((false, None));
    let right = feeder(tournament, next_index * 2 + 1).unwrap_or((false, None));
    let left_team = left.1.and_then(|p| tournament.team_of(p)).cloned();
    let right_team = right.1.and_then(|p| tournament.team_of(p)).cloned();

    let next = match tournament
        .matches
        .iter_mut()
        .find(|m| m.round == next_round && m.match_index == next_index)
    {
        Some(m) if !m.is_resolved() => m,
        // Final round, or a placeholder already resolved: nothing to fill.
        _ => return,
    };

    if let (true, Some(winner)) = left {
        next.player1 = Some(winner);
        if let Some(team) = left_team {
            next.player1_team = Some(team.name);
            next.player1_logo = team.logo;
        }
    }
    if let (true, Some(winner)) = right {
        next.player2 = Some(winner);
        if let Some(team) = right_team {
            next.player2_team = Some(team.name);
            next.player2_logo = team.logo;
        }
    }

    if left.0 && right.0 {
        let winners = left.1.iter().chain(right.1.iter()).count();
        match winners {
            2 => {}
            1 => {
                next.is_bye = true;
                next.status = MatchStatus::Completed;
                next.winner = left.1.or(right.1);
                propagate_result(tournament, next_round, next_index);
            }
            _ => {
                next.status = MatchStatus::Cancelled;
                propagate_result(tournament, next_round, next_index);
            }
        }
    }
}

/// Bracket view: knockout matches grouped by round, with display names.
pub fn bracket_rounds(tournament: &Tournament) -> Vec<BracketRound> {
    let total_rounds = tournament.knockout_rounds();
    (1..=total_rounds)
        .map(|round| {
            let mut matches: Vec<GameMatch> = tournament
                .matches
                .iter()
                .filter(|m| m.round == round)
                .cloned()
                .collect();
            matches.sort_by_key(|m| m.match_index);
            BracketRound {
                round,
                name: round_name(total_rounds, round),
                matches,
            }
        })
        .collect()
}
