//! Three-stage pattern matching against a precedent library.
//!
//! Each clause is ranked against a read-only [`PatternLibrary`] of known
//! negotiation precedents in three strictly sequential, narrowing stages:
//!
//! 1. **Keyword filter**: literal token overlap between the clause text and
//!    each pattern's keyword set; top 10 by overlap count.
//! 2. **Semantic rank**: normalized common-subsequence similarity between
//!    the clause text and each candidate's problem statement; top 5.
//! 3. **Context filter**: drop patterns whose position/leverage
//!    applicability excludes the request context; top 3, annotated with the
//!    pattern's historical success rate.
//!
//! Every stage breaks ties by the library's original order (stable sort),
//! so identical inputs always produce identical rankings. A clause with no
//! keyword overlap at all simply matches nothing; that is not an error.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::clause::{Applicability, LeverageLevel, NegotiationContext, PartyPosition, Snapshot};
use crate::util::{content_tokens, subsequence_ratio};

/// Default pipeline caps.
const MIN_TOKEN_LEN: usize = 4;
const KEYWORD_CANDIDATES: usize = 10;
const SEMANTIC_CANDIDATES: usize = 5;
const MAX_MATCHES: usize = 3;

/// One precedent in the externally supplied pattern library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternEntry {
    /// Stable identifier within the library.
    pub id: String,
    /// Topical category (e.g. "liability", "payment_terms").
    pub category: String,
    /// Keyword set used by the stage-1 filter. Stored sorted so entries
    /// compare and serialize deterministically.
    pub keywords: BTreeSet<String>,
    /// Description of the problem this precedent addresses; input to the
    /// stage-2 semantic rank.
    pub problem_statement: String,
    /// Template text for the suggested revision.
    pub revision_template: String,
    /// Historical success rate of this precedent, in [0, 1].
    pub success_rate: f64,
    /// Which negotiating position this pattern applies to.
    pub applicable_position: Applicability<PartyPosition>,
    /// Which leverage level this pattern applies to.
    pub applicable_leverage: Applicability<LeverageLevel>,
}

/// Read-only, ordered precedent library. The order entries were supplied in
/// is the tie-break order for every pipeline stage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PatternLibrary {
    entries: Vec<PatternEntry>,
}

impl PatternLibrary {
    pub fn new(entries: Vec<PatternEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PatternEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pipeline caps and the keyword tokenizer's minimum word length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum character count for a clause token to participate in the
    /// keyword filter.
    pub min_token_len: usize,
    /// Candidates kept after the keyword filter.
    pub keyword_candidates: usize,
    /// Candidates kept after the semantic rank.
    pub semantic_candidates: usize,
    /// Matches kept after the context filter.
    pub max_matches: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            min_token_len: MIN_TOKEN_LEN,
            keyword_candidates: KEYWORD_CANDIDATES,
            semantic_candidates: SEMANTIC_CANDIDATES,
            max_matches: MAX_MATCHES,
        }
    }
}

impl MatcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stage caps (keyword, semantic, final).
    pub fn with_stage_caps(mut self, keyword: usize, semantic: usize, max: usize) -> Self {
        self.keyword_candidates = keyword;
        self.semantic_candidates = semantic;
        self.max_matches = max;
        self
    }

    pub fn with_min_token_len(mut self, len: usize) -> Self {
        self.min_token_len = len;
        self
    }
}

/// One ranked precedent for a clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub pattern_id: String,
    /// Stage-2 semantic similarity score, in [0, 1].
    pub score: f64,
    /// The pattern's historical success rate, carried through for display.
    pub success_rate: f64,
}

/// Ranked matches (at most three) for one clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub clause_id: String,
    pub matches: Vec<PatternMatch>,
}

/// The three-stage matching pipeline.
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    config: MatcherConfig,
}

impl PatternMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MatcherConfig) -> Self {
        Self { config }
    }

    /// Rank one clause's text against the library.
    pub fn match_clause(
        &self,
        clause_text: &str,
        context: &NegotiationContext,
        library: &PatternLibrary,
    ) -> Vec<PatternMatch> {
        // Stage 1: keyword filter.
        let tokens: BTreeSet<String> =
            content_tokens(clause_text, self.config.min_token_len)
                .into_iter()
                .collect();

        let mut candidates: Vec<(usize, &PatternEntry)> = library
            .entries()
            .iter()
            .filter_map(|entry| {
                let overlap = entry
                    .keywords
                    .iter()
                    .filter(|kw| tokens.contains(kw.to_lowercase().as_str()))
                    .count();
                (overlap >= 1).then_some((overlap, entry))
            })
            .collect();

        if candidates.is_empty() {
            return Vec::new();
        }

        // Stable sort keeps library order for equal overlap counts.
        candidates.sort_by(|a, b| b.0.cmp(&a.0));
        candidates.truncate(self.config.keyword_candidates);

        // Stage 2: semantic rank against each problem statement.
        let mut ranked: Vec<(f64, &PatternEntry)> = candidates
            .into_iter()
            .map(|(_, entry)| (subsequence_ratio(clause_text, &entry.problem_statement), entry))
            .collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
        ranked.truncate(self.config.semantic_candidates);

        // Stage 3: context filter.
        ranked.retain(|(_, entry)| {
            entry.applicable_position.permits(&context.position)
                && entry.applicable_leverage.permits(&context.leverage)
        });
        ranked.truncate(self.config.max_matches);

        ranked
            .into_iter()
            .map(|(score, entry)| PatternMatch {
                pattern_id: entry.id.clone(),
                score,
                success_rate: entry.success_rate,
            })
            .collect()
    }

    /// Rank every clause in a snapshot, preserving snapshot order.
    ///
    /// Each clause is matched on its [`effective_text`]: the revised text
    /// when present, the original for removed clauses.
    ///
    /// [`effective_text`]: crate::ClauseChange::effective_text
    pub fn match_snapshot(
        &self,
        snapshot: &Snapshot,
        context: &NegotiationContext,
        library: &PatternLibrary,
    ) -> Vec<MatchResult> {
        snapshot
            .clauses()
            .iter()
            .map(|clause| MatchResult {
                clause_id: clause.clause_id.clone(),
                matches: self.match_clause(clause.effective_text(), context, library),
            })
            .collect()
    }
}
