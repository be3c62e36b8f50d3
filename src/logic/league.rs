//! Read-side standings: league tables, aggregates, and fixtures.
//!
//! Everything here is a pure fold over the completed match set, recomputed
//! on every query. No running totals are kept anywhere.

use crate::models::{
    BiggestWin, GameMatch, LeagueOverview, MatchStatus, Participant, StandingRow, Tournament,
    UserId,
};

/// Whether a match contributes to standings: completed on the pitch, with
/// both players and both scores known. Byes and cancellations never count.
fn counts_for_standings(game: &GameMatch) -> bool {
    game.status == MatchStatus::Completed
        && !game.is_bye
        && game.player1.is_some()
        && game.player2.is_some()
        && game.score_player1.is_some()
        && game.score_player2.is_some()
}

/// Fold a set of matches into a sorted table for the given members.
///
/// Rows start in registration order; the sort is stable on
/// points desc, goal difference desc, goals for desc, so full ties keep
/// registration order and the result is deterministic for a given match set.
pub(crate) fn compute_table<'a>(
    members: impl Iterator<Item = &'a Participant>,
    matches: impl Iterator<Item = &'a GameMatch>,
    point_weights: (i32, i32, i32),
) -> Vec<StandingRow> {
    let (win, draw, loss) = point_weights;
    let mut rows: Vec<StandingRow> = members
        .map(|p| StandingRow::new(p.user_id, p.selected_team.name.clone()))
        .collect();

    for game in matches.filter(|m| counts_for_standings(m)) {
        let (p1, p2) = (game.player1, game.player2);
        let (s1, s2) = (game.score_player1, game.score_player2);
        let (Some(p1), Some(p2), Some(s1), Some(s2)) = (p1, p2, s1, s2) else {
            continue;
        };
        for row in rows.iter_mut() {
            let (scored, conceded) = if row.user_id == p1 {
                (s1, s2)
            } else if row.user_id == p2 {
                (s2, s1)
            } else {
                continue;
            };
            row.played += 1;
            row.goals_for += scored;
            row.goals_against += conceded;
            row.goal_difference = row.goals_for as i32 - row.goals_against as i32;
            if scored > conceded {
                row.won += 1;
                row.points += win;
            } else if scored < conceded {
                row.lost += 1;
                row.points += loss;
            } else {
                row.drawn += 1;
                row.points += draw;
            }
        }
    }

    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference.cmp(&a.goal_difference))
            .then(b.goals_for.cmp(&a.goals_for))
    });
    rows
}

/// The whole-tournament round-robin table (league format, or any tournament
/// treated as one pool).
pub fn league_table(tournament: &Tournament) -> Vec<StandingRow> {
    compute_table(
        tournament.participants.iter(),
        tournament.matches.iter(),
        tournament.point_weights(),
    )
}

/// Best attack, best defense, and the biggest single-match win.
pub fn league_overview(tournament: &Tournament) -> LeagueOverview {
    let table = league_table(tournament);

    let best_attack = table.iter().max_by_key(|r| r.goals_for).cloned();
    let best_defense = table
        .iter()
        .filter(|r| r.played > 0)
        .min_by_key(|r| r.goals_against)
        .cloned();

    let mut biggest_win: Option<BiggestWin> = None;
    for game in tournament.matches.iter().filter(|m| counts_for_standings(m)) {
        let (Some(s1), Some(s2)) = (game.score_player1, game.score_player2) else {
            continue;
        };
        if s1 == s2 {
            continue;
        }
        let (winner, hi, lo) = if s1 > s2 {
            (game.player1, s1, s2)
        } else {
            (game.player2, s2, s1)
        };
        let Some(winner) = winner else { continue };
        let margin = hi - lo;
        if biggest_win.as_ref().map(|b| margin > b.margin).unwrap_or(true) {
            biggest_win = Some(BiggestWin {
                match_id: game.id,
                winner,
                score_winner: hi,
                score_loser: lo,
                margin,
            });
        }
    }

    LeagueOverview {
        best_attack,
        best_defense,
        biggest_win,
    }
}

/// All matches involving one participant, in schedule order.
pub fn participant_fixtures(tournament: &Tournament, user_id: UserId) -> Vec<GameMatch> {
    tournament
        .matches
        .iter()
        .filter(|m| m.involves(user_id))
        .cloned()
        .collect()
}
