use crate::{
    ChangeType, ClauseChange, EngineError, ImpactLevel, NetVerdict, PositionShift, Snapshot,
    Stability, Trajectory, TrendAnalyzer,
};

fn clause(id: &str, impact: ImpactLevel, shift: PositionShift) -> ClauseChange {
    ClauseChange {
        clause_id: id.to_string(),
        section_title: "Indemnity".to_string(),
        change_type: ChangeType::Modified,
        impact,
        position_shift: shift,
        original_text: "Old wording.".to_string(),
        revised_text: "New wording.".to_string(),
        focus_first: false,
        rationale: None,
    }
}

fn round(clauses: Vec<ClauseChange>) -> Snapshot {
    Snapshot::new(clauses).unwrap()
}

// RAG shorthand under the default tables:
// red   = (high, favors_counterparty)  -> 4.5
// amber = (medium, balanced)           -> 2.0
// green = (low, balanced)              -> 1.0
fn red(id: &str) -> ClauseChange {
    clause(id, ImpactLevel::High, PositionShift::FavorsCounterparty)
}
fn amber(id: &str) -> ClauseChange {
    clause(id, ImpactLevel::Medium, PositionShift::Balanced)
}
fn green(id: &str) -> ClauseChange {
    clause(id, ImpactLevel::Low, PositionShift::Balanced)
}

#[test]
fn red_amber_green_sequence_is_highly_volatile_and_better() {
    let rounds = vec![
        round(vec![red("c-1")]),
        round(vec![amber("c-1")]),
        round(vec![green("c-1")]),
    ];

    let report = TrendAnalyzer::new().analyze(&rounds).unwrap();

    assert!(report.trend_consistency_ok);
    assert_eq!(report.entries.len(), 1);
    let entry = &report.entries[0];
    assert_eq!(entry.transitions, 2);
    assert_eq!(entry.stability, Stability::HighlyVolatile);
    assert_eq!(entry.net_verdict, NetVerdict::Better);

    // Round 1 is all red (high_risk), round 3 all green (favorable).
    assert_eq!(report.trajectory, Trajectory::Improving);
}

#[test]
fn one_transition_is_moderately_volatile() {
    let rounds = vec![round(vec![amber("c-1")]), round(vec![red("c-1")])];
    let report = TrendAnalyzer::new().analyze(&rounds).unwrap();

    let entry = &report.entries[0];
    assert_eq!(entry.transitions, 1);
    assert_eq!(entry.stability, Stability::ModeratelyVolatile);
    assert_eq!(entry.net_verdict, NetVerdict::Worse);
    assert_eq!(report.trajectory, Trajectory::Worsening);
}

#[test]
fn clause_missing_from_a_middle_round_is_excluded_and_flagged() {
    let rounds = vec![
        round(vec![red("c-1"), amber("c-2")]),
        round(vec![amber("c-2")]), // c-1 absent
        round(vec![green("c-1"), amber("c-2")]),
    ];

    let report = TrendAnalyzer::new().analyze(&rounds).unwrap();

    assert!(!report.trend_consistency_ok);
    assert_eq!(report.missing_clauses.len(), 1);
    assert_eq!(report.missing_clauses[0].clause_id, "c-1");
    assert_eq!(report.missing_clauses[0].missing_in_rounds, vec![2]);

    // Only the fully-present clause is trended.
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].clause_id, "c-2");
    assert_eq!(report.entries[0].stability, Stability::Stable);
}

#[test]
fn clause_appearing_after_round_one_is_also_reported_missing() {
    let rounds = vec![
        round(vec![amber("c-1")]),
        round(vec![amber("c-1"), green("c-new")]),
    ];

    let report = TrendAnalyzer::new().analyze(&rounds).unwrap();

    assert!(!report.trend_consistency_ok);
    assert_eq!(report.missing_clauses.len(), 1);
    assert_eq!(report.missing_clauses[0].clause_id, "c-new");
    assert_eq!(report.missing_clauses[0].missing_in_rounds, vec![1]);
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].clause_id, "c-1");
}

#[test]
fn single_round_is_trivially_stable() {
    let rounds = vec![round(vec![red("c-1"), green("c-2")])];
    let report = TrendAnalyzer::new().analyze(&rounds).unwrap();

    assert_eq!(report.round_count, 1);
    assert!(report.trend_consistency_ok);
    assert_eq!(report.entries.len(), 2);
    for entry in &report.entries {
        assert_eq!(entry.transitions, 0);
        assert_eq!(entry.stability, Stability::Stable);
        assert_eq!(entry.net_verdict, NetVerdict::NoChange);
    }
    assert_eq!(report.trajectory, Trajectory::Stable);
}

#[test]
fn zero_rounds_is_rejected() {
    let err = TrendAnalyzer::new().analyze(&[]).unwrap_err();
    assert_eq!(err, EngineError::NoRounds);
}

#[test]
fn an_empty_round_is_rejected() {
    let rounds = vec![round(vec![amber("c-1")]), round(Vec::new())];
    let err = TrendAnalyzer::new().analyze(&rounds).unwrap_err();
    assert_eq!(err, EngineError::EmptySnapshot);
}

#[test]
fn entries_follow_first_round_clause_order() {
    let rounds = vec![
        round(vec![green("c-b"), amber("c-a"), red("c-c")]),
        round(vec![red("c-c"), green("c-b"), amber("c-a")]),
    ];
    let report = TrendAnalyzer::new().analyze(&rounds).unwrap();

    let ids: Vec<&str> = report.entries.iter().map(|e| e.clause_id.as_str()).collect();
    assert_eq!(ids, vec!["c-b", "c-a", "c-c"]);
}

#[test]
fn unchanged_rag_with_changed_score_still_counts_net_movement() {
    // amber at 2.0 -> amber at 3.0: zero transitions but a worse score.
    let rounds = vec![
        round(vec![clause("c-1", ImpactLevel::Medium, PositionShift::Balanced)]),
        round(vec![clause(
            "c-1",
            ImpactLevel::Medium,
            PositionShift::FavorsCounterparty,
        )]),
    ];
    let report = TrendAnalyzer::new().analyze(&rounds).unwrap();

    let entry = &report.entries[0];
    assert_eq!(entry.transitions, 0);
    assert_eq!(entry.stability, Stability::Stable);
    assert_eq!(entry.net_verdict, NetVerdict::Worse);
}
