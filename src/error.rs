use thiserror::Error;

use crate::session::SessionId;

/// Errors a caller of the game and settings APIs can act on.
///
/// Generation and enrichment failures are not in here: those are folded into
/// the returned guess (see [`crate::games::Guess::error`]).
#[derive(Debug, Error)]
pub enum GameError {
    #[error("input text cannot be empty")]
    EmptyInput,

    #[error("session {0} not found")]
    UnknownSession(SessionId),

    #[error("session {0} is already finished")]
    SessionFinished(SessionId),

    #[error("session {0} changed while the next guess was being made")]
    StaleFeedback(SessionId),

    #[error("invalid voice selection: {0}")]
    InvalidVoice(String),

    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    #[error("settings storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("settings serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type GameResult<T> = std::result::Result<T, GameError>;
