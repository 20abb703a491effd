// Error taxonomy shared by the judge and the agent

use thiserror::Error;

use crate::types::Seat;

/// Problems with a snapshot received by an agent.
/// `MissingField` is tolerated silently; `Malformed` is a real fault and is logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot is missing `{0}`")]
    MissingField(&'static str),

    #[error("malformed snapshot: {0}")]
    Malformed(String),
}

/// A move string that is neither `DIR` nor `DIR:BOOST`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveTokenError {
    #[error("unknown direction `{0}`")]
    UnknownDirection(String),

    #[error("malformed move token `{0}`")]
    Malformed(String),
}

/// Failure of a single request to an agent endpoint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("request timed out")]
    Timeout,

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unusable response body: {0}")]
    Body(String),
}

/// Rules settings the reference engine cannot play on
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("board {width}x{height} is smaller than the {min_width}x{min_height} minimum")]
    BoardTooSmall {
        width: i32,
        height: i32,
        min_width: i32,
        min_height: i32,
    },
}

/// Errors that stop a match from being played at all
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("player {seat} failed the connectivity check: {source}")]
    Connectivity {
        seat: Seat,
        #[source]
        source: ClientError,
    },
}
