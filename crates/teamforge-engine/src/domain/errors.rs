//! Error types for the Team Formation Engine.

use super::entities::{ParticipantId, TeamId};
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised by state store implementations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// I/O failure talking to the backing storage. Propagated to the caller,
    /// which retries or abandons the triggering operation; no partial state
    /// is ever applied.
    #[error("state store unavailable: {detail}")]
    Unavailable {
        /// Underlying failure description.
        detail: String,
    },

    /// The persisted document could not be decoded. The file adapter
    /// recovers by re-initializing an empty default document and logging the
    /// data loss; it never aborts the process.
    #[error("state document corrupt: {detail}")]
    Corrupt {
        /// Decoder failure description.
        detail: String,
    },

    /// The document could not be encoded for persistence.
    #[error("state document could not be encoded: {detail}")]
    Serialize {
        /// Encoder failure description.
        detail: String,
    },
}

impl StoreError {
    /// Wraps an I/O error.
    pub fn unavailable(err: std::io::Error) -> Self {
        Self::Unavailable {
            detail: err.to_string(),
        }
    }
}

/// Errors surfaced by the engine's operations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A load or read-only query hit a store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A create/disband/remove round hit a store failure while persisting.
    /// Queue and team state remain as of the last successful save.
    #[error("team operation failed: {source}")]
    TeamOperationFailed {
        /// The underlying store failure.
        source: StoreError,
    },

    /// No team with the given label exists.
    #[error("team {0} not found")]
    TeamNotFound(TeamId),

    /// The team exists but is archived.
    #[error("team {0} is not active")]
    TeamNotActive(TeamId),

    /// The participant is not a member of the given team.
    #[error("participant {participant} is not a member of team {team}")]
    MemberNotInTeam {
        /// Team label.
        team: TeamId,
        /// Participant id.
        participant: ParticipantId,
    },

    /// A teamed participant cannot re-enter the waiting queue; leaving the
    /// team comes first.
    #[error("participant {participant} is already in team {team}")]
    ParticipantTeamed {
        /// Participant id.
        participant: ParticipantId,
        /// The team the participant belongs to.
        team: TeamId,
    },

    /// Rejected configuration. Fatal at startup, never recoverable at
    /// runtime.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl EngineError {
    /// True if the error came from the backing store (retryable by the
    /// caller once storage recovers).
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Store(_) | Self::TeamOperationFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_are_flagged_retryable() {
        let err = EngineError::TeamOperationFailed {
            source: StoreError::Unavailable {
                detail: "disk full".to_string(),
            },
        };
        assert!(err.is_store_failure());
        assert!(!EngineError::TeamNotFound("T-1".to_string()).is_store_failure());
    }

    #[test]
    fn display_includes_underlying_detail() {
        let err = EngineError::TeamOperationFailed {
            source: StoreError::Unavailable {
                detail: "disk full".to_string(),
            },
        };
        assert!(err.to_string().contains("disk full"));
    }
}
