//! Integration tests for the match result state machine: submission,
//! confirmation, disputes, and reconciliation edge cases.

use footy_tournament_web::{
    admin_resolve, append_chat_message, begin_match, confirm_result, join_tournament,
    reject_result, start_tournament, submit_result, EngineError, MatchId, MatchStatus,
    TeamSelection, Tournament, TournamentFormat, TournamentStatus, UserId,
};
use uuid::Uuid;

fn tournament_with_players(
    format: TournamentFormat,
    max: u32,
    n: usize,
) -> (Tournament, UserId, Vec<UserId>) {
    let admin = Uuid::new_v4();
    let mut t = Tournament::new("Test Cup", format, max, admin);
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
    start_tournament(&mut t, admin).unwrap();
    (t, admin, users)
}

fn match_of(t: &Tournament, round: u32, index: u32) -> MatchId {
    t.matches
        .iter()
        .find(|m| m.round == round && m.match_index == index)
        .map(|m| m.id)
        .unwrap()
}

/// The four-player knockout scenario: A beats B 2-1, C beats D on penalties
/// after 1-1, then the final is A vs C.
#[test]
fn four_player_knockout_reaches_the_final() {
    let (mut t, _, u) = tournament_with_players(TournamentFormat::Knockout, 4, 4);
    let (a, b, c, d) = (u[0], u[1], u[2], u[3]);

    let semi0 = match_of(&t, 1, 0);
    submit_result(&mut t, semi0, a, 2, 1, None, "proof://ab").unwrap();
    confirm_result(&mut t, semi0, b).unwrap();
    {
        let m = t.match_by_id(semi0).unwrap();
        assert_eq!(m.status, MatchStatus::Completed);
        assert_eq!(m.winner, Some(a));
    }
    let final_id = match_of(&t, 2, 0);
    assert_eq!(t.match_by_id(final_id).unwrap().player1, Some(a));

    let semi1 = match_of(&t, 1, 1);
    submit_result(&mut t, semi1, c, 1, 1, Some((4, 3)), "proof://cd").unwrap();
    confirm_result(&mut t, semi1, d).unwrap();
    {
        let m = t.match_by_id(semi1).unwrap();
        assert_eq!(m.winner, Some(c));
        assert_eq!(m.penalties_player1, Some(4));
        assert_eq!(m.penalties_player2, Some(3));
    }
    let final_match = t.match_by_id(final_id).unwrap();
    assert_eq!(final_match.player1, Some(a));
    assert_eq!(final_match.player2, Some(c));
    assert_eq!(final_match.status, MatchStatus::Scheduled);

    // Play the final; the tournament completes with it.
    submit_result(&mut t, final_id, a, 1, 0, None, "proof://final").unwrap();
    confirm_result(&mut t, final_id, c).unwrap();
    assert_eq!(t.match_by_id(final_id).unwrap().winner, Some(a));
    assert_eq!(t.status, TournamentStatus::Completed);
}

#[test]
fn submitter_cannot_confirm_their_own_result() {
    let (mut t, _, u) = tournament_with_players(TournamentFormat::Knockout, 4, 4);
    let semi0 = match_of(&t, 1, 0);
    submit_result(&mut t, semi0, u[0], 2, 0, None, "proof://x").unwrap();
    assert_eq!(
        confirm_result(&mut t, semi0, u[0]),
        Err(EngineError::SubmitterCannotConfirm)
    );
    // No state change.
    assert_eq!(t.match_by_id(semi0).unwrap().status, MatchStatus::Review);
}

#[test]
fn outsiders_cannot_touch_a_match() {
    let (mut t, _, _) = tournament_with_players(TournamentFormat::Knockout, 4, 4);
    let outsider = Uuid::new_v4();
    let semi0 = match_of(&t, 1, 0);
    assert_eq!(
        submit_result(&mut t, semi0, outsider, 2, 0, None, "proof://x"),
        Err(EngineError::NotAMatchParticipant)
    );
    assert_eq!(
        begin_match(&mut t, semi0, outsider),
        Err(EngineError::NotAMatchParticipant)
    );
}

#[test]
fn knockout_draw_requires_unequal_penalties() {
    let (mut t, _, u) = tournament_with_players(TournamentFormat::Knockout, 4, 4);
    let semi0 = match_of(&t, 1, 0);
    assert_eq!(
        submit_result(&mut t, semi0, u[0], 1, 1, None, "proof://x"),
        Err(EngineError::MissingPenalties)
    );
    assert_eq!(
        submit_result(&mut t, semi0, u[0], 1, 1, Some((2, 2)), "proof://x"),
        Err(EngineError::EqualPenalties)
    );
    // Still untouched after the rejected submissions.
    assert_eq!(t.match_by_id(semi0).unwrap().status, MatchStatus::Scheduled);
}

#[test]
fn second_submission_loses_the_race() {
    let (mut t, _, u) = tournament_with_players(TournamentFormat::Knockout, 4, 4);
    let semi0 = match_of(&t, 1, 0);
    submit_result(&mut t, semi0, u[0], 2, 0, None, "proof://first").unwrap();
    // The opponent raced to submit too: they observe Review and conflict out.
    assert_eq!(
        submit_result(&mut t, semi0, u[1], 0, 2, None, "proof://second"),
        Err(EngineError::MatchState(MatchStatus::Review))
    );
    // The first submission is untouched.
    let m = t.match_by_id(semi0).unwrap();
    assert_eq!(m.submitted_by, Some(u[0]));
    assert_eq!(m.score_player1, Some(2));
}

#[test]
fn dispute_goes_to_admin_and_resolution_is_final() {
    let (mut t, admin, u) = tournament_with_players(TournamentFormat::Knockout, 4, 4);
    let semi0 = match_of(&t, 1, 0);

    submit_result(&mut t, semi0, u[0], 3, 0, None, "proof://claim").unwrap();
    reject_result(&mut t, semi0, u[1]).unwrap();
    {
        let m = t.match_by_id(semi0).unwrap();
        assert_eq!(m.status, MatchStatus::Dispute);
        // Submitted values stay visible for admin review.
        assert_eq!(m.score_player1, Some(3));
        assert_eq!(m.proof_screenshot.as_deref(), Some("proof://claim"));
        assert!(m.winner.is_none());
    }

    // Only the organizer can arbitrate.
    assert_eq!(
        admin_resolve(&mut t, semi0, u[1], u[0]),
        Err(EngineError::NotAdmin)
    );
    admin_resolve(&mut t, semi0, admin, u[0]).unwrap();
    let m = t.match_by_id(semi0).unwrap();
    assert_eq!(m.status, MatchStatus::Completed);
    assert_eq!(m.winner, Some(u[0]));
    assert!(m.admin_decision);
    // The winner propagated into the next round like a confirmation would.
    let final_match = t.matches.iter().find(|m| m.round == 2).unwrap();
    assert_eq!(final_match.player1, Some(u[0]));

    // Completed is terminal for both reconciliation paths.
    assert_eq!(
        confirm_result(&mut t, semi0, u[1]),
        Err(EngineError::MatchState(MatchStatus::Completed))
    );
    assert_eq!(
        reject_result(&mut t, semi0, u[1]),
        Err(EngineError::MatchState(MatchStatus::Completed))
    );
}

#[test]
fn rejecting_requires_the_non_submitter() {
    let (mut t, _, u) = tournament_with_players(TournamentFormat::Knockout, 4, 4);
    let semi0 = match_of(&t, 1, 0);
    submit_result(&mut t, semi0, u[0], 2, 0, None, "proof://x").unwrap();
    assert_eq!(
        reject_result(&mut t, semi0, u[0]),
        Err(EngineError::SubmitterCannotConfirm)
    );
}

#[test]
fn bye_matches_never_enter_review() {
    // 3 players in 4 slots: the first seed gets a bye.
    let (mut t, _, u) = tournament_with_players(TournamentFormat::Knockout, 4, 3);
    let bye = t.matches.iter().find(|m| m.is_bye).unwrap().id;
    assert_eq!(
        submit_result(&mut t, bye, u[0], 1, 0, None, "proof://x"),
        Err(EngineError::MatchState(MatchStatus::Completed))
    );
}

#[test]
fn league_draws_are_accepted_as_final() {
    let (mut t, _, u) = tournament_with_players(TournamentFormat::League, 2, 2);
    let game = t.matches[0].id;
    begin_match(&mut t, game, u[0]).unwrap();
    submit_result(&mut t, game, u[0], 1, 1, None, "proof://draw").unwrap();
    confirm_result(&mut t, game, u[1]).unwrap();
    let m = t.match_by_id(game).unwrap();
    assert_eq!(m.status, MatchStatus::Completed);
    assert!(m.winner.is_none());
    // A league with its only match drawn is still a finished league.
    assert_eq!(t.status, TournamentStatus::Completed);
}

#[test]
fn league_tie_ignores_submitted_penalties() {
    let (mut t, _, u) = tournament_with_players(TournamentFormat::League, 2, 2);
    let game = t.matches[0].id;
    // A client sends penalties anyway; a league tie still completes as a draw.
    submit_result(&mut t, game, u[0], 1, 1, Some((4, 3)), "proof://draw").unwrap();
    confirm_result(&mut t, game, u[1]).unwrap();
    let m = t.match_by_id(game).unwrap();
    assert_eq!(m.status, MatchStatus::Completed);
    assert_eq!(m.winner, None);
    assert_eq!(m.penalties_player1, None);
    assert_eq!(m.penalties_player2, None);
}

#[test]
fn submission_requires_a_proof_reference() {
    let (mut t, _, u) = tournament_with_players(TournamentFormat::Knockout, 4, 4);
    let semi0 = match_of(&t, 1, 0);
    assert_eq!(
        submit_result(&mut t, semi0, u[0], 2, 0, None, "  "),
        Err(EngineError::MissingProof)
    );
}

#[test]
fn match_chat_is_append_only_and_guarded() {
    let (mut t, admin, u) = tournament_with_players(TournamentFormat::Knockout, 4, 4);
    let semi0 = match_of(&t, 1, 0);

    append_chat_message(&mut t, semi0, u[0], "Player One", "ready when you are").unwrap();
    append_chat_message(&mut t, semi0, admin, "Admin", "good luck both").unwrap();
    assert_eq!(
        append_chat_message(&mut t, semi0, Uuid::new_v4(), "Rando", "hi"),
        Err(EngineError::NotAMatchParticipant)
    );
    assert_eq!(
        append_chat_message(&mut t, semi0, u[0], "Player One", "   "),
        Err(EngineError::EmptyChatMessage)
    );

    let m = t.match_by_id(semi0).unwrap();
    assert_eq!(m.chat_messages.len(), 2);
    assert_eq!(m.chat_messages[0].text, "ready when you are");
}
