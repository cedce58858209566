//! Error types for the engine boundary.
//!
//! Only structural problems are fatal: malformed enum values and duplicate
//! clause ids are rejected at ingestion, and the two degenerate-input cases
//! (empty snapshot, zero rounds) are rejected at the analyzer boundary.
//! Everything else in this crate degrades gracefully and is surfaced as
//! data: consistency findings as [`crate::ConsistencyViolation`] lists,
//! proposer failures as [`crate::ProposerFailure`] records.

use thiserror::Error;

/// Fatal, local errors raised at the engine boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// An enum-valued field carried a value outside its allowed set.
    #[error("invalid {field} value `{value}` for clause `{clause_id}`")]
    InvalidField {
        /// The clause the bad record belongs to.
        clause_id: String,
        /// Which field was out of set (e.g. "impact").
        field: &'static str,
        /// The offending raw value.
        value: String,
    },

    /// Two clause records in one snapshot share a `clause_id`.
    #[error("duplicate clause id `{clause_id}` in snapshot")]
    DuplicateClauseId { clause_id: String },

    /// A posture was requested for a snapshot with zero clauses.
    #[error("snapshot has no clauses; posture is undefined")]
    EmptySnapshot,

    /// Trend analysis was invoked with zero rounds.
    #[error("trend analysis requires at least one round")]
    NoRounds,
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
