//! Clause-change data model and the ingestion boundary.
//!
//! A [`Snapshot`] is one complete set of clause-change records for a single
//! negotiation round. Snapshots are immutable once constructed: every
//! derived structure (risk scores, pattern matches, trends) is recomputed
//! from them and never mutates them.
//!
//! Upstream systems hand records over in a loosely-typed shape
//! ([`RawClauseChange`], all enum fields as strings). Conversion into the
//! closed enum types happens once, at ingestion, so out-of-set values are
//! rejected with [`EngineError::InvalidField`] before any scoring runs
//! rather than checked ad hoc downstream.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// How a clause changed between the two compared drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// The clause is new in the revised draft.
    Inserted,
    /// The clause was deleted from the revised draft.
    Removed,
    /// The clause text was edited.
    Modified,
}

impl ChangeType {
    /// The wire name used by upstream record producers.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Inserted => "inserted",
            ChangeType::Removed => "removed",
            ChangeType::Modified => "modified",
        }
    }
}

impl FromStr for ChangeType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inserted" => Ok(ChangeType::Inserted),
            "removed" => Ok(ChangeType::Removed),
            "modified" => Ok(ChangeType::Modified),
            _ => Err(()),
        }
    }
}

/// Business impact of the change, as labeled by the upstream reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl ImpactLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactLevel::Low => "low",
            ImpactLevel::Medium => "medium",
            ImpactLevel::High => "high",
        }
    }
}

impl FromStr for ImpactLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(ImpactLevel::Low),
            "medium" => Ok(ImpactLevel::Medium),
            "high" => Ok(ImpactLevel::High),
            _ => Err(()),
        }
    }
}

/// Which party the change moves the clause toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionShift {
    /// The edit improves the customer's position.
    FavorsCustomer,
    /// The edit is neutral between the parties.
    Balanced,
    /// The edit improves the counterparty's position.
    FavorsCounterparty,
}

impl PositionShift {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionShift::FavorsCustomer => "favors_customer",
            PositionShift::Balanced => "balanced",
            PositionShift::FavorsCounterparty => "favors_counterparty",
        }
    }
}

impl FromStr for PositionShift {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "favors_customer" => Ok(PositionShift::FavorsCustomer),
            "balanced" => Ok(PositionShift::Balanced),
            "favors_counterparty" => Ok(PositionShift::FavorsCounterparty),
            _ => Err(()),
        }
    }
}

/// Which side of the table the requesting user sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyPosition {
    Customer,
    Counterparty,
}

/// How much negotiating leverage the requesting side holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeverageLevel {
    Weak,
    Balanced,
    Strong,
}

/// Request context shared by the pattern matcher and the revision proposer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationContext {
    pub position: PartyPosition,
    pub leverage: LeverageLevel,
}

impl NegotiationContext {
    pub fn new(position: PartyPosition, leverage: LeverageLevel) -> Self {
        Self { position, leverage }
    }
}

/// A pattern-entry applicability constraint: a specific value, or any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Applicability<T> {
    /// The pattern applies regardless of this context dimension.
    Any,
    /// The pattern applies only when the context carries this value.
    Only(T),
}

impl<T: PartialEq> Applicability<T> {
    /// Whether a context value satisfies this constraint.
    pub fn permits(&self, value: &T) -> bool {
        match self {
            Applicability::Any => true,
            Applicability::Only(only) => only == value,
        }
    }
}

/// One clause's state in one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseChange {
    /// Stable identifier, unique within a snapshot.
    pub clause_id: String,
    /// Display label for the clause's section.
    pub section_title: String,
    /// How the clause changed.
    pub change_type: ChangeType,
    /// Labeled business impact.
    pub impact: ImpactLevel,
    /// Which party the change favors.
    pub position_shift: PositionShift,
    /// Text in the baseline draft (empty for inserted clauses).
    pub original_text: String,
    /// Text in the revised draft (empty for removed clauses).
    pub revised_text: String,
    /// Reviewer's "look at this first" flag; at most one per snapshot.
    pub focus_first: bool,
    /// Optional free-text rationale from the upstream reviewer.
    pub rationale: Option<String>,
}

impl ClauseChange {
    /// The text downstream analysis should operate on: the revised text when
    /// present, otherwise the original (removed clauses have no revision).
    pub fn effective_text(&self) -> &str {
        if self.revised_text.is_empty() {
            &self.original_text
        } else {
            &self.revised_text
        }
    }
}

/// A clause-change record as produced by loosely-typed upstream systems:
/// same fields as [`ClauseChange`], enum fields carried as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawClauseChange {
    pub clause_id: String,
    pub section_title: String,
    pub change_type: String,
    pub impact: String,
    pub position_shift: String,
    #[serde(default)]
    pub original_text: String,
    #[serde(default)]
    pub revised_text: String,
    #[serde(default)]
    pub focus_first: bool,
    #[serde(default)]
    pub rationale: Option<String>,
}

impl TryFrom<RawClauseChange> for ClauseChange {
    type Error = EngineError;

    fn try_from(raw: RawClauseChange) -> Result<Self, Self::Error> {
        let invalid = |field: &'static str, value: &str| EngineError::InvalidField {
            clause_id: raw.clause_id.clone(),
            field,
            value: value.to_string(),
        };

        let change_type = raw
            .change_type
            .parse::<ChangeType>()
            .map_err(|()| invalid("change_type", &raw.change_type))?;
        let impact = raw
            .impact
            .parse::<ImpactLevel>()
            .map_err(|()| invalid("impact", &raw.impact))?;
        let position_shift = raw
            .position_shift
            .parse::<PositionShift>()
            .map_err(|()| invalid("position_shift", &raw.position_shift))?;

        Ok(ClauseChange {
            clause_id: raw.clause_id,
            section_title: raw.section_title,
            change_type,
            impact,
            position_shift,
            original_text: raw.original_text,
            revised_text: raw.revised_text,
            focus_first: raw.focus_first,
            rationale: raw.rationale,
        })
    }
}

/// An immutable, ordered set of clause-change records for one round.
///
/// Construction rejects duplicate clause ids; the record order given by the
/// caller is preserved and governs the order of every derived output. A
/// snapshot serializes as a plain record list, and deserialization runs the
/// same duplicate-id check as [`Snapshot::new`], so no construction path can
/// skip it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ClauseChange>", into = "Vec<ClauseChange>")]
pub struct Snapshot {
    clauses: Vec<ClauseChange>,
}

impl TryFrom<Vec<ClauseChange>> for Snapshot {
    type Error = EngineError;

    fn try_from(clauses: Vec<ClauseChange>) -> EngineResult<Self> {
        Self::new(clauses)
    }
}

impl From<Snapshot> for Vec<ClauseChange> {
    fn from(snapshot: Snapshot) -> Self {
        snapshot.clauses
    }
}

impl Snapshot {
    /// Build a snapshot from typed records, rejecting duplicate clause ids.
    pub fn new(clauses: Vec<ClauseChange>) -> EngineResult<Self> {
        let mut seen = HashSet::new();
        for clause in &clauses {
            if !seen.insert(clause.clause_id.as_str()) {
                return Err(EngineError::DuplicateClauseId {
                    clause_id: clause.clause_id.clone(),
                });
            }
        }
        Ok(Self { clauses })
    }

    /// Build a snapshot from raw records, rejecting out-of-set enum values
    /// and duplicate clause ids.
    pub fn from_raw(raw: Vec<RawClauseChange>) -> EngineResult<Self> {
        let clauses = raw
            .into_iter()
            .map(ClauseChange::try_from)
            .collect::<EngineResult<Vec<_>>>()?;
        Self::new(clauses)
    }

    /// The records in their original order.
    pub fn clauses(&self) -> &[ClauseChange] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Look up a clause by id.
    pub fn get(&self, clause_id: &str) -> Option<&ClauseChange> {
        self.clauses.iter().find(|c| c.clause_id == clause_id)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Snapshot({} clauses)", self.clauses.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str) -> RawClauseChange {
        RawClauseChange {
            clause_id: id.to_string(),
            section_title: "Limitation of Liability".to_string(),
            change_type: "modified".to_string(),
            impact: "high".to_string(),
            position_shift: "favors_counterparty".to_string(),
            original_text: "Liability is capped at fees paid.".to_string(),
            revised_text: "Liability is uncapped.".to_string(),
            focus_first: false,
            rationale: None,
        }
    }

    #[test]
    fn raw_record_parses_into_closed_enums() {
        let clause = ClauseChange::try_from(raw("c-1")).unwrap();
        assert_eq!(clause.change_type, ChangeType::Modified);
        assert_eq!(clause.impact, ImpactLevel::High);
        assert_eq!(clause.position_shift, PositionShift::FavorsCounterparty);
    }

    #[test]
    fn out_of_set_enum_value_is_rejected_at_ingestion() {
        let mut bad = raw("c-1");
        bad.impact = "catastrophic".to_string();
        let err = ClauseChange::try_from(bad).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidField {
                clause_id: "c-1".to_string(),
                field: "impact",
                value: "catastrophic".to_string(),
            }
        );
    }

    #[test]
    fn duplicate_clause_id_is_rejected() {
        let err = Snapshot::from_raw(vec![raw("c-1"), raw("c-1")]).unwrap_err();
        assert_eq!(
            err,
            EngineError::DuplicateClauseId {
                clause_id: "c-1".to_string()
            }
        );
    }

    #[test]
    fn effective_text_falls_back_to_original_for_removals() {
        let mut removed = ClauseChange::try_from(raw("c-1")).unwrap();
        removed.change_type = ChangeType::Removed;
        removed.revised_text = String::new();
        assert_eq!(removed.effective_text(), "Liability is capped at fees paid.");

        let modified = ClauseChange::try_from(raw("c-2")).unwrap();
        assert_eq!(modified.effective_text(), "Liability is uncapped.");
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let snapshot = Snapshot::from_raw(vec![raw("c-1"), raw("c-2")]).unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, back);
    }

    #[test]
    fn duplicate_clause_ids_are_rejected_at_deserialization_too() {
        // A record list with duplicate ids serializes fine as a plain vec
        // but must not deserialize into a Snapshot.
        let records = vec![
            ClauseChange::try_from(raw("c-1")).unwrap(),
            ClauseChange::try_from(raw("c-1")).unwrap(),
        ];
        let json = serde_json::to_string(&records).unwrap();

        let err = serde_json::from_str::<Snapshot>(&json).unwrap_err();
        assert!(err.to_string().contains("duplicate clause id `c-1`"));
    }

    #[test]
    fn applicability_permits() {
        assert!(Applicability::<PartyPosition>::Any.permits(&PartyPosition::Customer));
        assert!(Applicability::Only(PartyPosition::Customer).permits(&PartyPosition::Customer));
        assert!(!Applicability::Only(PartyPosition::Counterparty)
            .permits(&PartyPosition::Customer));
    }
}
