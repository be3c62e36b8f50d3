//! Group stage: allocation, round-robin scheduling, and group standings.

use crate::logic::league::compute_table;
use crate::models::{
    GameMatch, GroupSettings, GroupTable, StandingRow, Tournament, UserId,
};
use std::collections::HashSet;

/// Partition seeds into `number_of_groups` groups by registration order
/// modulo the group count. Any richer seeding (pots, ratings) is an admin
/// concern upstream of the engine.
pub fn allocate_groups(seeds: &[UserId], number_of_groups: u32) -> Vec<Vec<UserId>> {
    let g = number_of_groups.max(1) as usize;
    let mut groups: Vec<Vec<UserId>> = vec![Vec::new(); g];
    for (i, &user) in seeds.iter().enumerate() {
        groups[i % g].push(user);
    }
    groups
}

/// Every unordered pair exactly once, in a stable schedule order.
fn round_robin_pairs(n: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            pairs.push((i, j));
        }
    }
    pairs
}

/// Append a full single round-robin among `seeds`, with `round = 0` and the
/// given group index (None for a whole-field league schedule).
pub fn append_round_robin(
    tournament: &mut Tournament,
    seeds: &[UserId],
    group_index: Option<u32>,
) {
    let teams: Vec<_> = seeds
        .iter()
        .map(|&u| tournament.team_of(u).cloned())
        .collect();
    for (match_index, (i, j)) in round_robin_pairs(seeds.len()).into_iter().enumerate() {
        let mut game = GameMatch::new(
            tournament.id,
            0,
            match_index as u32,
            group_index,
            Some(seeds[i]),
            Some(seeds[j]),
        );
        if let Some(team) = &teams[i] {
            game.player1_team = Some(team.name.clone());
            game.player1_logo = team.logo.clone();
        }
        if let Some(team) = &teams[j] {
            game.player2_team = Some(team.name.clone());
            game.player2_logo = team.logo.clone();
        }
        tournament.matches.push(game);
    }
}

/// Materialize the whole group stage: allocate groups and schedule a
/// round-robin inside each.
pub fn append_group_matches(
    tournament: &mut Tournament,
    seeds: &[UserId],
    settings: GroupSettings,
) {
    for (group_index, group) in allocate_groups(seeds, settings.number_of_groups)
        .into_iter()
        .enumerate()
    {
        append_round_robin(tournament, &group, Some(group_index as u32));
    }
}

/// Live table for one group, top-Q rows flagged `qualified`.
pub fn group_standings(tournament: &Tournament, group_index: u32) -> Vec<StandingRow> {
    let members: HashSet<UserId> = tournament
        .matches
        .iter()
        .filter(|m| m.group_index == Some(group_index))
        .flat_map(|m| [m.player1, m.player2])
        .flatten()
        .collect();
    let mut rows = compute_table(
        tournament
            .participants
            .iter()
            .filter(|p| members.contains(&p.user_id)),
        tournament
            .matches
            .iter()
            .filter(|m| m.group_index == Some(group_index)),
        tournament.point_weights(),
    );
    let qualifiers = tournament
        .group_settings
        .map(|g| g.qualifiers_per_group)
        .unwrap_or(0) as usize;
    for row in rows.iter_mut().take(qualifiers) {
        row.qualified = true;
    }
    rows
}

/// All group tables, in group order.
pub fn group_tables(tournament: &Tournament) -> Vec<GroupTable> {
    let mut indices: Vec<u32> = tournament
        .matches
        .iter()
        .filter_map(|m| m.group_index)
        .collect();
    indices.sort_unstable();
    indices.dedup();
    indices
        .into_iter()
        .map(|group_index| GroupTable {
            group_index,
            rows: group_standings(tournament, group_index),
        })
        .collect()
}

/// The qualified participants of each group, best-ranked first.
pub fn qualifiers_per_group(tournament: &Tournament) -> Vec<Vec<UserId>> {
    group_tables(tournament)
        .into_iter()
        .map(|table| {
            table
                .rows
                .into_iter()
                .filter(|r| r.qualified)
                .map(|r| r.user_id)
                .collect()
        })
        .collect()
}
