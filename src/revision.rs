//! Minimal-revision validation and proposer orchestration.
//!
//! The engine never writes revision text itself. An external capability,
//! anything implementing [`RevisionProposer`], produces candidate text for
//! a clause, and this module scores how surgical that candidate is:
//!
//! - `change_ratio`: normalized character edit distance in [0, 1];
//! - `word_retention`: share of the original's words still present in the
//!   candidate (multiset, case-sensitive);
//! - `is_minimal`: change_ratio < 0.40 AND word_retention > 0.60.
//!
//! `is_minimal` is advisory metadata for downstream display and filtering.
//! What happens to a non-minimal candidate is the caller's choice, selected
//! via [`RevisionPolicy`].
//!
//! Only clauses classified amber or red are eligible; green clauses are
//! never sent to the proposer. Proposer calls are independent per clause: a
//! timeout or failure on one clause is recorded and the rest proceed.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clause::{ClauseChange, NegotiationContext, Snapshot};
use crate::error::EngineResult;
use crate::redline::{DiffSegment, RedlineRenderer};
use crate::risk::{RagClass, RiskConfig};
use crate::util::levenshtein;

/// Default minimality thresholds.
const MAX_CHANGE_RATIO: f64 = 0.40;
const MIN_WORD_RETENTION: f64 = 0.60;

/// Default per-clause proposer timeout.
const PROPOSER_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure of the external proposer for a single clause. Non-fatal: the
/// clause simply gets no suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProposerError {
    /// The proposer did not answer within the allotted time.
    #[error("proposer timed out after {0:?}")]
    Timeout(Duration),
    /// The proposer answered with an error.
    #[error("proposer failed: {0}")]
    Failed(String),
}

/// The injected external text-generation capability.
///
/// Implementations own timeout enforcement: `timeout` is the caller-supplied
/// budget for this one call, and exceeding it should surface as
/// [`ProposerError::Timeout`]. The engine stays synchronous and
/// deterministic; all the nondeterminism lives behind this trait.
pub trait RevisionProposer {
    fn propose(
        &self,
        clause: &ClauseChange,
        context: &NegotiationContext,
        timeout: Duration,
    ) -> Result<String, ProposerError>;
}

/// What to do with a candidate that fails the minimality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionPolicy {
    /// Keep the candidate and rely on the `is_minimal` flag downstream.
    /// This is the default: the validator is advisory, not a gatekeeper.
    AcceptAlways,
    /// Ask the proposer once more, then keep whatever the retry returns.
    RetryOnceThenAccept,
    /// Drop non-minimal candidates; the clause gets no suggestion.
    RejectNonMinimal,
}

/// Minimality thresholds, retry policy, and the per-clause proposer budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionConfig {
    /// A candidate is minimal only if change_ratio is below this.
    pub max_change_ratio: f64,
    /// A candidate is minimal only if word_retention is above this.
    pub min_word_retention: f64,
    /// Policy applied when a candidate is not minimal.
    pub policy: RevisionPolicy,
    /// Time budget handed to the proposer for each clause.
    pub proposer_timeout: Duration,
}

impl Default for RevisionConfig {
    fn default() -> Self {
        Self {
            max_change_ratio: MAX_CHANGE_RATIO,
            min_word_retention: MIN_WORD_RETENTION,
            policy: RevisionPolicy::AcceptAlways,
            proposer_timeout: PROPOSER_TIMEOUT,
        }
    }
}

impl RevisionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: RevisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_thresholds(mut self, max_change_ratio: f64, min_word_retention: f64) -> Self {
        self.max_change_ratio = max_change_ratio;
        self.min_word_retention = min_word_retention;
        self
    }

    pub fn with_proposer_timeout(mut self, timeout: Duration) -> Self {
        self.proposer_timeout = timeout;
        self
    }
}

/// The three minimality measurements for one (original, candidate) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevisionMetrics {
    pub change_ratio: f64,
    pub word_retention: f64,
    pub is_minimal: bool,
}

/// A scored candidate revision for one clause, with its display diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionSuggestion {
    pub clause_id: String,
    /// Candidate text produced by the external proposer.
    pub candidate_text: String,
    pub change_ratio: f64,
    pub word_retention: f64,
    pub is_minimal: bool,
    pub diff_segments: Vec<DiffSegment>,
}

/// A per-clause proposer failure, surfaced as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposerFailure {
    pub clause_id: String,
    pub error: String,
}

/// Result of a revision pass over one snapshot: suggestions in snapshot
/// order for every eligible clause that produced one, plus the clauses whose
/// proposer call failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionOutcome {
    pub suggestions: Vec<RevisionSuggestion>,
    pub failures: Vec<ProposerFailure>,
}

/// Scores candidate revisions for surgical-ness. Never generates text.
#[derive(Debug, Clone, Default)]
pub struct RevisionValidator {
    config: RevisionConfig,
}

impl RevisionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RevisionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RevisionConfig {
        &self.config
    }

    /// Measure how much a candidate changes the original.
    ///
    /// Identical strings (including two empty strings) measure as zero
    /// change; an original with no words trivially retains everything.
    pub fn measure(&self, original: &str, candidate: &str) -> RevisionMetrics {
        let longest = original.chars().count().max(candidate.chars().count());
        let change_ratio = if longest == 0 {
            0.0
        } else {
            levenshtein(original, candidate) as f64 / longest as f64
        };

        let word_retention = word_retention(original, candidate);

        RevisionMetrics {
            change_ratio,
            word_retention,
            is_minimal: change_ratio < self.config.max_change_ratio
                && word_retention > self.config.min_word_retention,
        }
    }

    /// Score a candidate for one clause and attach its display diff.
    pub fn validate(&self, clause: &ClauseChange, candidate_text: &str) -> RevisionSuggestion {
        let metrics = self.measure(&clause.original_text, candidate_text);
        let diff_segments = RedlineRenderer::new().render(&clause.original_text, candidate_text);

        RevisionSuggestion {
            clause_id: clause.clause_id.clone(),
            candidate_text: candidate_text.to_string(),
            change_ratio: metrics.change_ratio,
            word_retention: metrics.word_retention,
            is_minimal: metrics.is_minimal,
            diff_segments,
        }
    }

    /// Run a revision pass over a snapshot.
    ///
    /// Eligibility: only clauses whose RAG class (under `risk`) is amber or
    /// red are sent to the proposer. Each eligible clause gets one
    /// independently-budgeted proposer call (plus at most one retry under
    /// [`RevisionPolicy::RetryOnceThenAccept`]); one clause's failure never
    /// blocks the others. Output preserves snapshot order.
    pub fn suggest_revisions(
        &self,
        snapshot: &Snapshot,
        context: &NegotiationContext,
        risk: &RiskConfig,
        proposer: &dyn RevisionProposer,
    ) -> EngineResult<RevisionOutcome> {
        let assessment = risk.assess_snapshot(snapshot)?;
        let rag_by_clause: HashMap<&str, RagClass> = assessment
            .per_clause
            .iter()
            .map(|a| (a.clause_id.as_str(), a.rag_class))
            .collect();

        let mut suggestions = Vec::new();
        let mut failures = Vec::new();

        for clause in snapshot.clauses() {
            match rag_by_clause.get(clause.clause_id.as_str()) {
                Some(RagClass::Amber) | Some(RagClass::Red) => {}
                _ => continue, // green clauses never reach the proposer
            }

            match self.propose_with_policy(clause, context, proposer) {
                Ok(Some(suggestion)) => suggestions.push(suggestion),
                Ok(None) => {} // rejected by policy; no suggestion
                Err(error) => failures.push(ProposerFailure {
                    clause_id: clause.clause_id.clone(),
                    error: error.to_string(),
                }),
            }
        }

        Ok(RevisionOutcome {
            suggestions,
            failures,
        })
    }

    fn propose_with_policy(
        &self,
        clause: &ClauseChange,
        context: &NegotiationContext,
        proposer: &dyn RevisionProposer,
    ) -> Result<Option<RevisionSuggestion>, ProposerError> {
        let candidate = proposer.propose(clause, context, self.config.proposer_timeout)?;
        let suggestion = self.validate(clause, &candidate);

        if suggestion.is_minimal {
            return Ok(Some(suggestion));
        }

        match self.config.policy {
            RevisionPolicy::AcceptAlways => Ok(Some(suggestion)),
            RevisionPolicy::RejectNonMinimal => Ok(None),
            RevisionPolicy::RetryOnceThenAccept => {
                let retry = proposer.propose(clause, context, self.config.proposer_timeout)?;
                Ok(Some(self.validate(clause, &retry)))
            }
        }
    }
}

/// Share of the original's whitespace-split words still available in the
/// candidate, counted as a multiset and case-sensitively.
fn word_retention(original: &str, candidate: &str) -> f64 {
    let original_words: Vec<&str> = original.split_whitespace().collect();
    if original_words.is_empty() {
        return 1.0;
    }

    let mut available: HashMap<&str, usize> = HashMap::new();
    for word in candidate.split_whitespace() {
        *available.entry(word).or_insert(0) += 1;
    }

    let retained = original_words
        .iter()
        .filter(|word| {
            if let Some(count) = available.get_mut(**word) {
                if *count > 0 {
                    *count -= 1;
                    return true;
                }
            }
            false
        })
        .count();

    retained as f64 / original_words.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_retention_is_case_sensitive() {
        assert_eq!(word_retention("Vendor shall pay", "vendor shall pay"), 2.0 / 3.0);
    }

    #[test]
    fn word_retention_counts_multiset() {
        // The original uses "pay" twice; the candidate only once.
        assert_eq!(word_retention("pay pay now", "pay now"), 2.0 / 3.0);
    }

    #[test]
    fn word_retention_of_empty_original_is_total() {
        assert_eq!(word_retention("", "anything at all"), 1.0);
    }
}
