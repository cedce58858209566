//! Risk scoring and snapshot-level posture aggregation.
//!
//! Risk is a pure product of two fixed weight tables: one over labeled
//! impact, one over position shift. The product maps onto a red/amber/green
//! classification, and the RAG distribution of a whole snapshot maps onto a
//! negotiation posture.
//!
//! All tables and thresholds live in [`RiskConfig`], passed explicitly into
//! each operation so tests can substitute alternate tables without touching
//! shared state.

use serde::{Deserialize, Serialize};

use crate::clause::{ClauseChange, ImpactLevel, PositionShift, Snapshot};
use crate::error::{EngineError, EngineResult};

/// Default impact weights.
const IMPACT_LOW: f64 = 1.0;
const IMPACT_MEDIUM: f64 = 2.0;
const IMPACT_HIGH: f64 = 3.0;

/// Default position-shift weights.
const SHIFT_FAVORS_CUSTOMER: f64 = 0.5;
const SHIFT_BALANCED: f64 = 1.0;
const SHIFT_FAVORS_COUNTERPARTY: f64 = 1.5;

/// Default RAG thresholds: red at `score >= 4.0`, amber at `score >= 2.0`.
const RED_THRESHOLD: f64 = 4.0;
const AMBER_THRESHOLD: f64 = 2.0;

/// Default posture cutoffs, in percent.
const HIGH_RISK_RED_PCT: f64 = 40.0;
const MODERATE_RED_PCT: f64 = 20.0;
const FAVORABLE_GREEN_PCT: f64 = 60.0;

/// Red/amber/green risk classification for one clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RagClass {
    Red,
    Amber,
    Green,
}

impl RagClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RagClass::Red => "red",
            RagClass::Amber => "amber",
            RagClass::Green => "green",
        }
    }
}

/// Aggregate, snapshot-level characterization of negotiation risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Posture {
    HighRisk,
    Moderate,
    Favorable,
    Balanced,
}

impl Posture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Posture::HighRisk => "high_risk",
            Posture::Moderate => "moderate",
            Posture::Favorable => "favorable",
            Posture::Balanced => "balanced",
        }
    }

    /// Ordering used by trajectory comparison:
    /// favorable > balanced > moderate > high_risk.
    pub fn rank(&self) -> u8 {
        match self {
            Posture::HighRisk => 0,
            Posture::Moderate => 1,
            Posture::Balanced => 2,
            Posture::Favorable => 3,
        }
    }
}

/// Weight tables, RAG thresholds, and posture cutoffs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Weight applied per impact level (low, medium, high).
    pub impact_weights: [f64; 3],
    /// Weight applied per position shift (favors_customer, balanced,
    /// favors_counterparty).
    pub shift_weights: [f64; 3],
    /// Scores at or above this are red.
    pub red_threshold: f64,
    /// Scores at or above this (and below red) are amber.
    pub amber_threshold: f64,
    /// Red percentage above which the posture is high_risk.
    pub high_risk_red_pct: f64,
    /// Red percentage above which the posture is moderate.
    pub moderate_red_pct: f64,
    /// Green percentage above which the posture is favorable.
    pub favorable_green_pct: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            impact_weights: [IMPACT_LOW, IMPACT_MEDIUM, IMPACT_HIGH],
            shift_weights: [
                SHIFT_FAVORS_CUSTOMER,
                SHIFT_BALANCED,
                SHIFT_FAVORS_COUNTERPARTY,
            ],
            red_threshold: RED_THRESHOLD,
            amber_threshold: AMBER_THRESHOLD,
            high_risk_red_pct: HIGH_RISK_RED_PCT,
            moderate_red_pct: MODERATE_RED_PCT,
            favorable_green_pct: FAVORABLE_GREEN_PCT,
        }
    }
}

impl RiskConfig {
    /// Create a config with the standard tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the impact weight table (low, medium, high).
    pub fn with_impact_weights(mut self, weights: [f64; 3]) -> Self {
        self.impact_weights = weights;
        self
    }

    /// Replace the shift weight table (favors_customer, balanced,
    /// favors_counterparty).
    pub fn with_shift_weights(mut self, weights: [f64; 3]) -> Self {
        self.shift_weights = weights;
        self
    }

    /// Replace the RAG thresholds.
    pub fn with_rag_thresholds(mut self, amber: f64, red: f64) -> Self {
        self.amber_threshold = amber;
        self.red_threshold = red;
        self
    }

    /// Weight for an impact level.
    pub fn impact_weight(&self, impact: ImpactLevel) -> f64 {
        match impact {
            ImpactLevel::Low => self.impact_weights[0],
            ImpactLevel::Medium => self.impact_weights[1],
            ImpactLevel::High => self.impact_weights[2],
        }
    }

    /// Weight for a position shift.
    pub fn shift_weight(&self, shift: PositionShift) -> f64 {
        match shift {
            PositionShift::FavorsCustomer => self.shift_weights[0],
            PositionShift::Balanced => self.shift_weights[1],
            PositionShift::FavorsCounterparty => self.shift_weights[2],
        }
    }

    /// Risk score: the product of the two weights. Pure and total over the
    /// finite (impact, shift) domain.
    pub fn risk_score(&self, impact: ImpactLevel, shift: PositionShift) -> f64 {
        self.impact_weight(impact) * self.shift_weight(shift)
    }

    /// Classify a score into red/amber/green.
    pub fn rag_class(&self, score: f64) -> RagClass {
        if score >= self.red_threshold {
            RagClass::Red
        } else if score >= self.amber_threshold {
            RagClass::Amber
        } else {
            RagClass::Green
        }
    }

    /// Score and classify one clause.
    pub fn assess(&self, clause: &ClauseChange) -> RiskAssessment {
        let risk_score = self.risk_score(clause.impact, clause.position_shift);
        RiskAssessment {
            clause_id: clause.clause_id.clone(),
            risk_score,
            rag_class: self.rag_class(risk_score),
        }
    }

    /// Score every clause and aggregate the snapshot posture.
    ///
    /// Per-clause assessments come back in snapshot order. An empty snapshot
    /// is rejected: the posture of nothing is undefined.
    pub fn assess_snapshot(&self, snapshot: &Snapshot) -> EngineResult<SnapshotAssessment> {
        if snapshot.is_empty() {
            return Err(EngineError::EmptySnapshot);
        }

        let per_clause: Vec<RiskAssessment> =
            snapshot.clauses().iter().map(|c| self.assess(c)).collect();
        let summary = self.summarize(&per_clause);

        Ok(SnapshotAssessment { per_clause, summary })
    }

    /// Aggregate RAG counts into a posture summary.
    ///
    /// The posture rules are evaluated in fixed priority order and the first
    /// matching rule wins. This is intentional: a snapshot with red_pct=25
    /// and green_pct=70 is `moderate`, not `favorable`, because the moderate
    /// rule is checked first. Do not reorder these branches or replace them
    /// with a highest-share comparison.
    fn summarize(&self, assessments: &[RiskAssessment]) -> PostureSummary {
        let total = assessments.len();
        let red_count = assessments
            .iter()
            .filter(|a| a.rag_class == RagClass::Red)
            .count();
        let amber_count = assessments
            .iter()
            .filter(|a| a.rag_class == RagClass::Amber)
            .count();
        let green_count = total - red_count - amber_count;

        let pct = |count: usize| count as f64 / total as f64 * 100.0;
        let red_pct = pct(red_count);
        let amber_pct = pct(amber_count);
        let green_pct = pct(green_count);

        let posture = if red_pct > self.high_risk_red_pct {
            Posture::HighRisk
        } else if red_pct > self.moderate_red_pct {
            Posture::Moderate
        } else if green_pct > self.favorable_green_pct {
            Posture::Favorable
        } else {
            Posture::Balanced
        };

        PostureSummary {
            red_count,
            amber_count,
            green_count,
            red_pct,
            amber_pct,
            green_pct,
            posture,
        }
    }
}

/// Derived risk classification for one clause. Never stored apart from the
/// snapshot it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub clause_id: String,
    pub risk_score: f64,
    pub rag_class: RagClass,
}

/// RAG distribution and posture for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureSummary {
    pub red_count: usize,
    pub amber_count: usize,
    pub green_count: usize,
    pub red_pct: f64,
    pub amber_pct: f64,
    pub green_pct: f64,
    pub posture: Posture,
}

/// Full per-snapshot risk output: per-clause assessments in snapshot order
/// plus the aggregate summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotAssessment {
    pub per_clause: Vec<RiskAssessment>,
    pub summary: PostureSummary,
}
