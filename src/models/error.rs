use serde::Serialize;
use thiserror::Error;

/// Every way a room operation can be rejected.
///
/// None of these are fatal: a rejected call leaves the room exactly as it
/// was, and the transport layer decides how to report the kind.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "data")]
pub enum GameError {
    /// Malformed request data (e.g. blank room or player name)
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Square text that is not a file 'a'-'h' followed by a rank '1'-'8'
    #[error("invalid square: {0:?}")]
    InvalidSquare(String),
    /// Board placement text that could not be parsed
    #[error("invalid placement: {0}")]
    InvalidPlacement(String),
    #[error("room not found: {0}")]
    RoomNotFound(String),
    #[error("room is full")]
    RoomFull,
    #[error("player not found: {0}")]
    PlayerNotFound(String),
    #[error("game is not in progress")]
    GameNotInProgress,
    #[error("not your turn")]
    NotYourTurn,
    #[error("no piece at {0}")]
    NoPieceAtSource(String),
    #[error("illegal move: {from} to {to}")]
    IllegalMove { from: String, to: String },
}

impl GameError {
    /// Stable name of the error kind, independent of the message text.
    pub fn kind(&self) -> &'static str {
        match self {
            GameError::InvalidInput(_) => "InvalidInput",
            GameError::InvalidSquare(_) => "InvalidSquare",
            GameError::InvalidPlacement(_) => "InvalidPlacement",
            GameError::RoomNotFound(_) => "RoomNotFound",
            GameError::RoomFull => "RoomFull",
            GameError::PlayerNotFound(_) => "PlayerNotFound",
            GameError::GameNotInProgress => "GameNotInProgress",
            GameError::NotYourTurn => "NotYourTurn",
            GameError::NoPieceAtSource(_) => "NoPieceAtSource",
            GameError::IllegalMove { .. } => "IllegalMove",
        }
    }
}
