//! Integration tests for knockout bracket generation: byes, placeholders,
//! round naming, and forward propagation at generation time.

use footy_tournament_web::{
    bracket_size, join_tournament, round_name, start_tournament, MatchStatus, TeamSelection,
    Tournament, TournamentFormat, UserId,
};
use uuid::Uuid;

fn knockout_with_players(max: u32, n: usize) -> (Tournament, UserId, Vec<UserId>) {
    let admin = Uuid::new_v4();
    let mut t = Tournament::new("Test Cup", TournamentFormat::Knockout, max, admin);
    let mut users = Vec::new();
    for i in 0..n {
        let user = Uuid::new_v4();
        join_tournament(
            &mut t,
            user,
            TeamSelection {
                name: format!("Team {i}"),
                logo: None,
            },
        )
        .unwrap();
        users.push(user);
    }
    (t, admin, users)
}

#[test]
fn full_field_generates_all_rounds() {
    let (mut t, admin, _) = knockout_with_players(4, 4);
    start_tournament(&mut t, admin).unwrap();

    let round1: Vec<_> = t.matches.iter().filter(|m| m.round == 1).collect();
    let round2: Vec<_> = t.matches.iter().filter(|m| m.round == 2).collect();
    assert_eq!(round1.len(), 2);
    assert_eq!(round2.len(), 1);
    for m in &round1 {
        assert!(m.player1.is_some() && m.player2.is_some());
        assert!(!m.is_bye);
        assert_eq!(m.status, MatchStatus::Scheduled);
    }
    // The final is a true placeholder until the semis complete.
    assert!(round2[0].player1.is_none() && round2[0].player2.is_none());
}

#[test]
fn five_joined_in_eight_slots_gives_three_byes() {
    let (mut t, admin, users) = knockout_with_players(8, 5);
    start_tournament(&mut t, admin).unwrap();

    let round1: Vec<_> = t.matches.iter().filter(|m| m.round == 1).collect();
    assert_eq!(round1.len(), 4); // M/2 for M=8

    let byes: Vec<_> = round1.iter().filter(|m| m.is_bye).collect();
    assert_eq!(byes.len(), 3);
    for m in &byes {
        assert_eq!(m.status, MatchStatus::Completed);
        assert!(m.winner.is_some());
        // Exactly one slot occupied.
        assert!(m.player1.is_some() != m.player2.is_some());
    }

    // The two non-bye seeds pair off for real.
    let real: Vec<_> = round1.iter().filter(|m| !m.is_bye).collect();
    assert_eq!(real.len(), 1);
    assert_eq!(real[0].player1, Some(users[3]));
    assert_eq!(real[0].player2, Some(users[4]));

    // Bye winners are pre-filled into round 2: first semifinal is already a
    // complete pairing of the first two seeds.
    let semi0 = t
        .matches
        .iter()
        .find(|m| m.round == 2 && m.match_index == 0)
        .unwrap();
    assert_eq!(semi0.player1, Some(users[0]));
    assert_eq!(semi0.player2, Some(users[1]));
    assert_eq!(semi0.status, MatchStatus::Scheduled);
}

#[test]
fn both_slots_empty_is_cancelled_and_feeds_a_bye() {
    // 3 seeds in an 8-slot bracket: three byes plus one match nobody can play.
    let (mut t, admin, users) = knockout_with_players(8, 3);
    start_tournament(&mut t, admin).unwrap();

    let empty = t
        .matches
        .iter()
        .find(|m| m.round == 1 && m.match_index == 3)
        .unwrap();
    assert_eq!(empty.status, MatchStatus::Cancelled);
    assert!(!empty.is_bye);
    assert!(empty.winner.is_none());

    // Its round-2 dependent has one live feeder (the bye of users[2]) and
    // one cancelled feeder, so it resolves as a bye itself.
    let semi1 = t
        .matches
        .iter()
        .find(|m| m.round == 2 && m.match_index == 1)
        .unwrap();
    assert!(semi1.is_bye);
    assert_eq!(semi1.status, MatchStatus::Completed);
    assert_eq!(semi1.winner, Some(users[2]));

    // And the chain continues: users[2] is already waiting in the final.
    let final_match = t.matches.iter().find(|m| m.round == 3).unwrap();
    assert_eq!(final_match.player2, Some(users[2]));
    assert_eq!(final_match.status, MatchStatus::Scheduled);
}

#[test]
fn byes_carry_team_names() {
    let (mut t, admin, _) = knockout_with_players(4, 3);
    start_tournament(&mut t, admin).unwrap();
    let bye = t.matches.iter().find(|m| m.is_bye).unwrap();
    assert_eq!(bye.player1_team.as_deref(), Some("Team 0"));
}

#[test]
fn bracket_size_is_total_on_u32() {
    assert_eq!(bracket_size(0), 2);
    assert_eq!(bracket_size(5), 8);
    assert_eq!(bracket_size(1024), 1024);
    // Inputs past the largest u32 power of two saturate instead of wrapping.
    assert_eq!(bracket_size(3_000_000_000), 1 << 31);
    assert_eq!(bracket_size(u32::MAX), 1 << 31);
}

#[test]
fn round_names_count_back_from_the_final() {
    assert_eq!(round_name(1, 1), "Final");
    assert_eq!(round_name(2, 1), "Semifinal");
    assert_eq!(round_name(3, 1), "Quarterfinal");
    assert_eq!(round_name(4, 1), "Round of 16");
    assert_eq!(round_name(4, 4), "Final");
    assert_eq!(round_name(5, 1), "Round of 32");
}
