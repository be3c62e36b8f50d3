//! Match result state machine: submit, confirm, reject, admin arbitration.
//!
//! `Scheduled -> Ongoing -> Review -> Completed`, with the alternate
//! `Review -> Dispute -> Completed` path and a terminal `Cancelled` from
//! `Scheduled`. Every transition validates before it mutates; an illegal
//! precondition leaves the match untouched.

use crate::error::EngineError;
use crate::logic::orchestrator;
use crate::models::{ChatMessage, MatchId, MatchStatus, Tournament, UserId};
use chrono::Utc;

/// A participant marks the match as being played: `Scheduled -> Ongoing`.
pub fn begin_match(
    tournament: &mut Tournament,
    match_id: MatchId,
    actor: UserId,
) -> Result<(), EngineError> {
    let game = tournament
        .match_by_id_mut(match_id)
        .ok_or(EngineError::MatchNotFound)?;
    if game.status != MatchStatus::Scheduled {
        return Err(EngineError::MatchState(game.status));
    }
    if !game.involves(actor) {
        return Err(EngineError::NotAMatchParticipant);
    }
    game.status = MatchStatus::Ongoing;
    Ok(())
}

/// One of the two players submits the result: `Scheduled/Ongoing -> Review`.
///
/// Requires both scores and a proof reference. If regulation ended level in
/// a decisive-result match (any knockout round), unequal penalty scores are
/// mandatory. A second near-simultaneous submitter finds the match already
/// in `Review` and gets a state conflict, never a silent overwrite.
pub fn submit_result(
    tournament: &mut Tournament,
    match_id: MatchId,
    submitter: UserId,
    score_player1: u32,
    score_player2: u32,
    penalties: Option<(u32, u32)>,
    proof_screenshot: &str,
) -> Result<(), EngineError> {
    let decisive = {
        let game = tournament
            .match_by_id(match_id)
            .ok_or(EngineError::MatchNotFound)?;
        tournament.requires_decisive_result(game)
    };
    let game = tournament
        .match_by_id_mut(match_id)
        .ok_or(EngineError::MatchNotFound)?;

    if !matches!(game.status, MatchStatus::Scheduled | MatchStatus::Ongoing) {
        return Err(EngineError::MatchState(game.status));
    }
    if !game.involves(submitter) {
        return Err(EngineError::NotAMatchParticipant);
    }
    if proof_screenshot.trim().is_empty() {
        return Err(EngineError::MissingProof);
    }
    if score_player1 == score_player2 && decisive {
        match penalties {
            None => return Err(EngineError::MissingPenalties),
            Some((p1, p2)) if p1 == p2 => return Err(EngineError::EqualPenalties),
            Some(_) => {}
        }
    }

    game.score_player1 = Some(score_player1);
    game.score_player2 = Some(score_player2);
    // Penalties only apply when a level score must still produce a winner;
    // a level score in a non-decisive match stays a draw.
    if score_player1 == score_player2 && decisive {
        if let Some((p1, p2)) = penalties {
            game.penalties_player1 = Some(p1);
            game.penalties_player2 = Some(p2);
        }
    }
    game.submitted_by = Some(submitter);
    game.proof_screenshot = Some(proof_screenshot.trim().to_string());
    game.status = MatchStatus::Review;
    Ok(())
}

/// The opponent confirms the submitted result: `Review -> Completed`.
///
/// Only the participant who did NOT submit may confirm. The winner is
/// computed from scores (penalties on a level score); a level score in a
/// non-decisive match completes as a draw. Knockout winners propagate into
/// the next round's placeholder. Confirming an already-completed match hits
/// the status precondition and fails, so there is no double-advance.
pub fn confirm_result(
    tournament: &mut Tournament,
    match_id: MatchId,
    confirmer: UserId,
) -> Result<(), EngineError> {
    let game = tournament
        .match_by_id_mut(match_id)
        .ok_or(EngineError::MatchNotFound)?;
    if game.status != MatchStatus::Review {
        return Err(EngineError::MatchState(game.status));
    }
    if !game.involves(confirmer) {
        return Err(EngineError::NotAMatchParticipant);
    }
    if game.submitted_by == Some(confirmer) {
        return Err(EngineError::SubmitterCannotConfirm);
    }

    game.winner = game.decide_winner();
    game.status = MatchStatus::Completed;
    orchestrator::handle_match_resolved(tournament, match_id);
    Ok(())
}

/// The opponent rejects the submitted result: `Review -> Dispute`.
///
/// No winner is set; the submitted scores and proof stay visible for admin
/// review.
pub fn reject_result(
    tournament: &mut Tournament,
    match_id: MatchId,
    rejecter: UserId,
) -> Result<(), EngineError> {
    let game = tournament
        .match_by_id_mut(match_id)
        .ok_or(EngineError::MatchNotFound)?;
    if game.status != MatchStatus::Review {
        return Err(EngineError::MatchState(game.status));
    }
    if !game.involves(rejecter) {
        return Err(EngineError::NotAMatchParticipant);
    }
    if game.submitted_by == Some(rejecter) {
        return Err(EngineError::SubmitterCannotConfirm);
    }
    game.status = MatchStatus::Dispute;
    Ok(())
}

/// Admin arbitration of a dispute: `Dispute -> Completed` with a forced
/// winner and the `admin_decision` audit flag. The submitted scores are
/// retained but the admin decision is the authoritative result.
pub fn admin_resolve(
    tournament: &mut Tournament,
    match_id: MatchId,
    admin: UserId,
    winner_id: UserId,
) -> Result<(), EngineError> {
    if !tournament.is_admin(admin) {
        return Err(EngineError::NotAdmin);
    }
    let game = tournament
        .match_by_id_mut(match_id)
        .ok_or(EngineError::MatchNotFound)?;
    if game.status != MatchStatus::Dispute {
        return Err(EngineError::MatchState(game.status));
    }
    if !game.involves(winner_id) {
        return Err(EngineError::WinnerNotInMatch);
    }
    game.winner = Some(winner_id);
    game.status = MatchStatus::Completed;
    game.admin_decision = true;
    orchestrator::handle_match_resolved(tournament, match_id);
    Ok(())
}

/// Administrative cancellation of a not-yet-played match:
/// `Scheduled -> Cancelled`. The bracket is re-evaluated so a dependent
/// placeholder can fall back to a bye.
pub fn cancel_match(
    tournament: &mut Tournament,
    match_id: MatchId,
    admin: UserId,
) -> Result<(), EngineError> {
    if !tournament.is_admin(admin) {
        return Err(EngineError::NotAdmin);
    }
    let game = tournament
        .match_by_id_mut(match_id)
        .ok_or(EngineError::MatchNotFound)?;
    if game.status != MatchStatus::Scheduled {
        return Err(EngineError::MatchState(game.status));
    }
    game.status = MatchStatus::Cancelled;
    orchestrator::handle_match_resolved(tournament, match_id);
    Ok(())
}

/// Append one message to the match's chat channel. Participants and the
/// organizer may write; the channel is append-only and survives completion.
pub fn append_chat_message(
    tournament: &mut Tournament,
    match_id: MatchId,
    sender_id: UserId,
    sender_name: &str,
    text: &str,
) -> Result<(), EngineError> {
    let is_admin = tournament.is_admin(sender_id);
    let game = tournament
        .match_by_id_mut(match_id)
        .ok_or(EngineError::MatchNotFound)?;
    if game.status == MatchStatus::Cancelled {
        return Err(EngineError::MatchState(game.status));
    }
    if !game.involves(sender_id) && !is_admin {
        return Err(EngineError::NotAMatchParticipant);
    }
    let text = text.trim();
    if text.is_empty() {
        return Err(EngineError::EmptyChatMessage);
    }
    game.chat_messages.push(ChatMessage {
        sender_id,
        sender_name: sender_name.to_string(),
        text: text.to_string(),
        timestamp: Utc::now(),
    });
    Ok(())
}
