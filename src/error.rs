//! Error taxonomy for the engine.
//!
//! Every failure rejects a single operation with no partial mutation; there
//! is no fatal category. `ErrorKind` is the coarse classification the HTTP
//! layer maps to status codes (400/403/404/409).

use crate::models::{MatchStatus, TournamentStatus};
use thiserror::Error;

/// Coarse classification of an [`EngineError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Malformed or incomplete input.
    Validation,
    /// The actor is not allowed to perform the transition.
    Authorization,
    /// The transition is not legal from the current state (includes races;
    /// recoverable by re-fetching and retrying).
    Conflict,
    NotFound,
}

/// Errors that can occur during tournament and match operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum EngineError {
    // Validation
    #[error("team name must not be empty")]
    EmptyTeamName,
    #[error("a proof screenshot reference is required")]
    MissingProof,
    #[error("penalty scores are required when a decisive match ends level")]
    MissingPenalties,
    #[error("penalty scores must not be equal")]
    EqualPenalties,
    #[error("chat message must not be empty")]
    EmptyChatMessage,
    #[error("hybrid tournaments require group settings")]
    MissingGroupSettings,
    #[error("need at least {required} participants to start (have {actual})")]
    NotEnoughParticipants { required: usize, actual: usize },
    #[error("winner must be one of the two match participants")]
    WinnerNotInMatch,
    #[error("max_participants must be between 2 and {limit} (got {requested})")]
    InvalidCapacity { requested: u32, limit: u32 },

    // Authorization
    #[error("only the tournament organizer can perform this action")]
    NotAdmin,
    #[error("user is not a participant of this tournament")]
    NotAParticipant,
    #[error("user is not a participant of this match")]
    NotAMatchParticipant,
    #[error("the submitting player cannot confirm their own result")]
    SubmitterCannotConfirm,

    // Conflict
    #[error("tournament is full ({max} participants)")]
    TournamentFull { max: u32 },
    #[error("team '{0}' is already taken in this tournament")]
    TeamTaken(String),
    #[error("user already joined this tournament")]
    AlreadyJoined,
    #[error("action not allowed while the tournament is {0:?}")]
    TournamentState(TournamentStatus),
    #[error("action not allowed while the match is {0:?}")]
    MatchState(MatchStatus),

    // Not found
    #[error("tournament not found")]
    TournamentNotFound,
    #[error("match not found")]
    MatchNotFound,
    #[error("participant not found")]
    ParticipantNotFound,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        use EngineError::*;
        match self {
            EmptyTeamName | MissingProof | MissingPenalties | EqualPenalties
            | EmptyChatMessage | MissingGroupSettings | NotEnoughParticipants { .. }
            | WinnerNotInMatch | InvalidCapacity { .. } => ErrorKind::Validation,
            NotAdmin | NotAParticipant | NotAMatchParticipant | SubmitterCannotConfirm => {
                ErrorKind::Authorization
            }
            TournamentFull { .. } | TeamTaken(_) | AlreadyJoined | TournamentState(_)
            | MatchState(_) => ErrorKind::Conflict,
            TournamentNotFound | MatchNotFound | ParticipantNotFound => ErrorKind::NotFound,
        }
    }
}
