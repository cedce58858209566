//! Advisory structural validation over a set of clause records.
//!
//! The validator returns findings as data; an empty list means the records
//! are consistent. Nothing here is ever corrected silently, and nothing is
//! thrown: the caller decides whether a finding warns or blocks. (Fatal
//! structural problems are a different animal: they are rejected at the
//! ingestion boundary by [`Snapshot::from_raw`], before any scoring runs.)
//!
//! [`Snapshot::from_raw`]: crate::Snapshot::from_raw

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clause::{ChangeType, ClauseChange, RawClauseChange};

/// One consistency finding, surfaced as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsistencyViolation {
    /// Two records share a clause id.
    DuplicateClauseId { clause_id: String },
    /// More than one record carries `focus_first = true`.
    MultipleFocusFirst { clause_ids: Vec<String> },
    /// A raw record carries an enum value outside its allowed set.
    InvalidFieldValue {
        clause_id: String,
        field: String,
        value: String,
    },
    /// A caller-declared aggregate count disagrees with the clause list.
    CountMismatch {
        kind: String,
        declared: usize,
        actual: usize,
    },
}

impl fmt::Display for ConsistencyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyViolation::DuplicateClauseId { clause_id } => {
                write!(f, "duplicate clause id `{clause_id}`")
            }
            ConsistencyViolation::MultipleFocusFirst { clause_ids } => write!(
                f,
                "multiple focus_first flags: {}",
                clause_ids.join(", ")
            ),
            ConsistencyViolation::InvalidFieldValue {
                clause_id,
                field,
                value,
            } => write!(
                f,
                "invalid {field} value `{value}` for clause `{clause_id}`"
            ),
            ConsistencyViolation::CountMismatch {
                kind,
                declared,
                actual,
            } => write!(
                f,
                "declared {kind} count {declared} but found {actual}"
            ),
        }
    }
}

/// Aggregate counts a caller may have precomputed upstream. Any populated
/// field is cross-checked against a scan of the clause list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeclaredTotals {
    pub inserted: Option<usize>,
    pub removed: Option<usize>,
    pub modified: Option<usize>,
    pub total: Option<usize>,
}

/// Structural/semantic invariant checker for clause records.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyValidator;

impl ConsistencyValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate typed records. Enum fields are closed types here, so only
    /// the id/flag/count invariants can be violated.
    pub fn validate(
        &self,
        clauses: &[ClauseChange],
        declared: Option<&DeclaredTotals>,
    ) -> Vec<ConsistencyViolation> {
        let mut violations = Vec::new();

        self.check_duplicate_ids(clauses.iter().map(|c| c.clause_id.as_str()), &mut violations);
        self.check_focus_first(
            clauses
                .iter()
                .filter(|c| c.focus_first)
                .map(|c| c.clause_id.clone()),
            &mut violations,
        );

        if let Some(declared) = declared {
            let count_of = |ct: ChangeType| clauses.iter().filter(|c| c.change_type == ct).count();
            self.check_count(declared.inserted, "inserted", count_of(ChangeType::Inserted), &mut violations);
            self.check_count(declared.removed, "removed", count_of(ChangeType::Removed), &mut violations);
            self.check_count(declared.modified, "modified", count_of(ChangeType::Modified), &mut violations);
            self.check_count(declared.total, "total", clauses.len(), &mut violations);
        }

        violations
    }

    /// Validate raw records before ingestion. In addition to everything
    /// [`validate`](Self::validate) checks, out-of-set enum strings are
    /// reported (as findings, not errors; the fatal path is
    /// `Snapshot::from_raw`).
    pub fn validate_raw(
        &self,
        records: &[RawClauseChange],
        declared: Option<&DeclaredTotals>,
    ) -> Vec<ConsistencyViolation> {
        let mut violations = Vec::new();

        for record in records {
            let mut check = |field: &str, value: &str, ok: bool| {
                if !ok {
                    violations.push(ConsistencyViolation::InvalidFieldValue {
                        clause_id: record.clause_id.clone(),
                        field: field.to_string(),
                        value: value.to_string(),
                    });
                }
            };
            check(
                "change_type",
                &record.change_type,
                record.change_type.parse::<ChangeType>().is_ok(),
            );
            check(
                "impact",
                &record.impact,
                record.impact.parse::<crate::ImpactLevel>().is_ok(),
            );
            check(
                "position_shift",
                &record.position_shift,
                record.position_shift.parse::<crate::PositionShift>().is_ok(),
            );
        }

        self.check_duplicate_ids(records.iter().map(|r| r.clause_id.as_str()), &mut violations);
        self.check_focus_first(
            records
                .iter()
                .filter(|r| r.focus_first)
                .map(|r| r.clause_id.clone()),
            &mut violations,
        );

        if let Some(declared) = declared {
            let count_of = |ct: &str| records.iter().filter(|r| r.change_type == ct).count();
            self.check_count(declared.inserted, "inserted", count_of("inserted"), &mut violations);
            self.check_count(declared.removed, "removed", count_of("removed"), &mut violations);
            self.check_count(declared.modified, "modified", count_of("modified"), &mut violations);
            self.check_count(declared.total, "total", records.len(), &mut violations);
        }

        violations
    }

    fn check_duplicate_ids<'a>(
        &self,
        ids: impl Iterator<Item = &'a str>,
        violations: &mut Vec<ConsistencyViolation>,
    ) {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for id in ids {
            *seen.entry(id).or_insert(0) += 1;
        }
        let mut duplicates: Vec<&str> = seen
            .into_iter()
            .filter_map(|(id, count)| (count > 1).then_some(id))
            .collect();
        duplicates.sort_unstable();
        for clause_id in duplicates {
            violations.push(ConsistencyViolation::DuplicateClauseId {
                clause_id: clause_id.to_string(),
            });
        }
    }

    fn check_focus_first(
        &self,
        flagged: impl Iterator<Item = String>,
        violations: &mut Vec<ConsistencyViolation>,
    ) {
        let clause_ids: Vec<String> = flagged.collect();
        if clause_ids.len() > 1 {
            violations.push(ConsistencyViolation::MultipleFocusFirst { clause_ids });
        }
    }

    fn check_count(
        &self,
        declared: Option<usize>,
        kind: &str,
        actual: usize,
        violations: &mut Vec<ConsistencyViolation>,
    ) {
        if let Some(declared) = declared {
            if declared != actual {
                violations.push(ConsistencyViolation::CountMismatch {
                    kind: kind.to_string(),
                    declared,
                    actual,
                });
            }
        }
    }
}
