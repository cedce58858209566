//! Cross-round trend analysis.
//!
//! Given an ordered sequence of snapshots (one per negotiation round), the
//! analyzer tracks how each clause's RAG classification evolves and how the
//! snapshot-level posture moves between the first and last round.
//!
//! A clause participates in trend computation only when it is present in
//! every round. Clauses missing from at least one round are reported (with
//! the 1-based rounds they were absent from) and excluded; any such clause
//! marks the whole run `trend_consistency_ok = false`.
//!
//! A single round is a defined degenerate case, not an error: every clause
//! is trivially stable with no net change, and the trajectory is stable.

use serde::{Deserialize, Serialize};

use crate::clause::Snapshot;
use crate::error::{EngineError, EngineResult};
use crate::risk::{PostureSummary, RiskConfig};

/// How much a clause's RAG class moved across rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    /// No transitions between consecutive rounds.
    Stable,
    /// Exactly one transition.
    ModeratelyVolatile,
    /// Two or more transitions.
    HighlyVolatile,
}

impl Stability {
    fn from_transitions(transitions: usize) -> Self {
        match transitions {
            0 => Stability::Stable,
            1 => Stability::ModeratelyVolatile,
            _ => Stability::HighlyVolatile,
        }
    }
}

/// First-round versus last-round risk comparison. Lower risk is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetVerdict {
    Better,
    Worse,
    NoChange,
}

/// Direction of the snapshot-level posture between baseline and final round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trajectory {
    Improving,
    Worsening,
    Stable,
}

/// Risk evolution of one clause tracked across every round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendEntry {
    pub clause_id: String,
    /// Number of consecutive-round RAG class changes.
    pub transitions: usize,
    pub stability: Stability,
    pub net_verdict: NetVerdict,
}

/// A clause excluded from trend computation because it is absent from at
/// least one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingClause {
    pub clause_id: String,
    /// 1-based round numbers the clause was absent from.
    pub missing_in_rounds: Vec<usize>,
}

/// Full multi-round trend output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    /// Per-clause trends, in first-round clause order. Only clauses present
    /// in every round appear here.
    pub entries: Vec<TrendEntry>,
    /// Clauses excluded because they were missing from at least one round.
    pub missing_clauses: Vec<MissingClause>,
    /// False whenever any clause was excluded for missing rounds.
    pub trend_consistency_ok: bool,
    /// Posture movement between the first and last round.
    pub trajectory: Trajectory,
    /// Posture of the first round.
    pub baseline: PostureSummary,
    /// Posture of the last round.
    pub last: PostureSummary,
    pub round_count: usize,
}

/// Aggregates per-clause risk evolution across an ordered round sequence.
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    risk: RiskConfig,
}

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_risk_config(risk: RiskConfig) -> Self {
        Self { risk }
    }

    /// Analyze an ordered sequence of rounds.
    ///
    /// Zero rounds is rejected with [`EngineError::NoRounds`]; an empty
    /// round is rejected with [`EngineError::EmptySnapshot`] since its
    /// posture is undefined.
    pub fn analyze(&self, rounds: &[Snapshot]) -> EngineResult<TrendReport> {
        let first = rounds.first().ok_or(EngineError::NoRounds)?;

        // Reject empty rounds up front so the per-clause pass below can
        // assume every round has a posture.
        let assessments = rounds
            .iter()
            .map(|round| self.risk.assess_snapshot(round))
            .collect::<EngineResult<Vec<_>>>()?;

        let mut entries = Vec::new();
        let mut missing_clauses = Vec::new();

        for clause in first.clauses() {
            let missing = rounds_missing(clause.clause_id.as_str(), rounds);
            if !missing.is_empty() {
                missing_clauses.push(MissingClause {
                    clause_id: clause.clause_id.clone(),
                    missing_in_rounds: missing,
                });
                continue;
            }

            let scores: Vec<_> = assessments
                .iter()
                .flat_map(|a| &a.per_clause)
                .filter(|a| a.clause_id == clause.clause_id)
                .collect();

            let transitions = scores
                .windows(2)
                .filter(|pair| pair[0].rag_class != pair[1].rag_class)
                .count();

            let first_score = scores[0].risk_score;
            let last_score = scores[scores.len() - 1].risk_score;
            let net_verdict = if last_score < first_score {
                NetVerdict::Better
            } else if last_score > first_score {
                NetVerdict::Worse
            } else {
                NetVerdict::NoChange
            };

            entries.push(TrendEntry {
                clause_id: clause.clause_id.clone(),
                transitions,
                stability: Stability::from_transitions(transitions),
                net_verdict,
            });
        }

        // Clauses that first appear after round one are also inconsistent:
        // they are necessarily missing from at least the first round.
        for (round_idx, round) in rounds.iter().enumerate().skip(1) {
            for clause in round.clauses() {
                let already_known = first.get(&clause.clause_id).is_some()
                    || missing_clauses
                        .iter()
                        .any(|m| m.clause_id == clause.clause_id)
                    || rounds[1..round_idx]
                        .iter()
                        .any(|earlier| earlier.get(&clause.clause_id).is_some());
                if !already_known {
                    missing_clauses.push(MissingClause {
                        clause_id: clause.clause_id.clone(),
                        missing_in_rounds: rounds_missing(clause.clause_id.as_str(), rounds),
                    });
                }
            }
        }

        let baseline = assessments[0].summary.clone();
        let final_summary = assessments[assessments.len() - 1].summary.clone();

        let trajectory = match final_summary
            .posture
            .rank()
            .cmp(&baseline.posture.rank())
        {
            std::cmp::Ordering::Greater => Trajectory::Improving,
            std::cmp::Ordering::Less => Trajectory::Worsening,
            std::cmp::Ordering::Equal => Trajectory::Stable,
        };

        Ok(TrendReport {
            trend_consistency_ok: missing_clauses.is_empty(),
            entries,
            missing_clauses,
            trajectory,
            baseline,
            last: final_summary,
            round_count: rounds.len(),
        })
    }
}

/// 1-based round numbers in which `clause_id` does not appear.
fn rounds_missing(clause_id: &str, rounds: &[Snapshot]) -> Vec<usize> {
    rounds
        .iter()
        .enumerate()
        .filter_map(|(idx, round)| round.get(clause_id).is_none().then_some(idx + 1))
        .collect()
}
