//! Deterministic clause risk scoring and redline synthesis engine.
//!
//! This crate turns clause-level change records (edits between two drafts
//! of a negotiated document) into quantitative analysis:
//!
//! ## Per-Snapshot Analysis
//!
//! - [`RiskConfig`] - Risk scoring (impact × shift weight product), RAG
//!   classification, and snapshot posture aggregation
//! - [`PatternMatcher`] - Three-stage ranking against a precedent library
//!   (keyword filter → semantic rank → context filter)
//! - [`ConsistencyValidator`] - Advisory structural invariant checks
//!
//! ## Revision Scoring
//!
//! - [`RevisionValidator`] - Scores externally proposed candidate revisions
//!   for surgical-ness (change ratio, word retention, minimality)
//! - [`RevisionProposer`] - The injected external text-generation capability;
//!   this crate never generates revision text itself
//! - [`RedlineRenderer`] - Lossless word-level diff segments for display
//!
//! ## Cross-Round Analysis
//!
//! - [`TrendAnalyzer`] - Per-clause RAG stability and net verdict across an
//!   ordered sequence of negotiation rounds, plus the posture trajectory
//!
//! ## Determinism
//!
//! Everything except the proposer call is a pure, synchronous function of
//! its inputs. Snapshots are immutable; derived structures are recomputed on
//! demand and output ordering always follows snapshot order. Malformed
//! structural input fails loudly at ingestion ([`Snapshot::from_raw`]);
//! external proposer failures degrade gracefully to partial results.
//!
//! ## Example
//!
//! ```
//! use clause_redline::{
//!     LeverageLevel, NegotiationContext, PartyPosition, RawClauseChange, RiskConfig, Snapshot,
//! };
//!
//! let snapshot = Snapshot::from_raw(vec![RawClauseChange {
//!     clause_id: "c-1".to_string(),
//!     section_title: "Indemnity".to_string(),
//!     change_type: "modified".to_string(),
//!     impact: "high".to_string(),
//!     position_shift: "favors_counterparty".to_string(),
//!     original_text: "Vendor indemnifies Customer.".to_string(),
//!     revised_text: "Customer indemnifies Vendor.".to_string(),
//!     focus_first: true,
//!     rationale: None,
//! }])
//! .unwrap();
//!
//! let assessment = RiskConfig::default().assess_snapshot(&snapshot).unwrap();
//! assert_eq!(assessment.per_clause[0].risk_score, 4.5);
//! # let _ = NegotiationContext::new(PartyPosition::Customer, LeverageLevel::Balanced);
//! ```

mod clause;
mod consistency;
mod error;
mod pattern;
mod redline;
mod revision;
mod risk;
mod trend;
mod util;

pub use clause::{
    Applicability, ChangeType, ClauseChange, ImpactLevel, LeverageLevel, NegotiationContext,
    PartyPosition, PositionShift, RawClauseChange, Snapshot,
};
pub use consistency::{ConsistencyValidator, ConsistencyViolation, DeclaredTotals};
pub use error::{EngineError, EngineResult};
pub use pattern::{
    MatchResult, MatcherConfig, PatternEntry, PatternLibrary, PatternMatch, PatternMatcher,
};
pub use redline::{
    reconstruct_original, reconstruct_revised, render_markup, DiffSegment, RedlineRenderer,
    SegmentKind,
};
pub use revision::{
    ProposerError, ProposerFailure, RevisionConfig, RevisionMetrics, RevisionOutcome,
    RevisionPolicy, RevisionProposer, RevisionSuggestion, RevisionValidator,
};
pub use risk::{
    Posture, PostureSummary, RagClass, RiskAssessment, RiskConfig, SnapshotAssessment,
};
pub use trend::{
    MissingClause, NetVerdict, Stability, TrendAnalyzer, TrendEntry, TrendReport, Trajectory,
};
