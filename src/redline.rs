//! Redline rendering: lossless word-level diff segments.
//!
//! [`RedlineRenderer::render`] aligns two texts with a longest-common-
//! subsequence alignment over their word-boundary tokens and emits an
//! ordered list of [`DiffSegment`]s tagged unchanged/deleted/inserted.
//!
//! The reconstruction contract holds for every input, including empty and
//! fully disjoint texts: concatenating the unchanged and deleted segments,
//! in order, reproduces the original text exactly; concatenating the
//! unchanged and inserted segments reproduces the revised text exactly.
//! Tokenization uses Unicode word boundaries, which partition the input
//! without dropping any whitespace or punctuation, so no character can be
//! lost.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Classification of one diff segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Text present in both versions.
    Unchanged,
    /// Text present only in the revised version.
    Inserted,
    /// Text present only in the original version.
    Deleted,
}

/// One run of diff output. A segment never mixes kinds; adjacent tokens of
/// the same kind are merged into a single segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment {
    pub text: String,
    pub kind: SegmentKind,
}

impl DiffSegment {
    pub fn new(text: impl Into<String>, kind: SegmentKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Alignment operation over token indices.
#[derive(Debug, Clone, Copy)]
enum DiffOp {
    /// Token at (original_idx, revised_idx) matches.
    Equal(usize, usize),
    /// Token at revised_idx exists only in the revised text.
    Insert(usize),
    /// Token at original_idx exists only in the original text.
    Delete(usize),
}

/// Word-level diff renderer. Pure and total: it never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedlineRenderer;

impl RedlineRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render the ordered diff segments between two texts.
    ///
    /// At each edit point, deleted runs are emitted before inserted runs.
    pub fn render(&self, original: &str, revised: &str) -> Vec<DiffSegment> {
        let left: Vec<&str> = original.split_word_bounds().collect();
        let right: Vec<&str> = revised.split_word_bounds().collect();

        let ops = lcs_diff(&left, &right);

        // Group each maximal run of non-equal ops so deletions always
        // precede insertions within one edit region.
        let mut segments: Vec<DiffSegment> = Vec::new();
        let mut pending_deletes = String::new();
        let mut pending_inserts = String::new();

        let mut flush =
            |segments: &mut Vec<DiffSegment>, deletes: &mut String, inserts: &mut String| {
                if !deletes.is_empty() {
                    push_merged(segments, std::mem::take(deletes), SegmentKind::Deleted);
                }
                if !inserts.is_empty() {
                    push_merged(segments, std::mem::take(inserts), SegmentKind::Inserted);
                }
            };

        for op in ops {
            match op {
                DiffOp::Equal(i, _) => {
                    flush(&mut segments, &mut pending_deletes, &mut pending_inserts);
                    push_merged(&mut segments, left[i].to_string(), SegmentKind::Unchanged);
                }
                DiffOp::Delete(i) => pending_deletes.push_str(left[i]),
                DiffOp::Insert(j) => pending_inserts.push_str(right[j]),
            }
        }
        flush(&mut segments, &mut pending_deletes, &mut pending_inserts);

        segments
    }
}

/// Append text of the given kind, merging with the previous segment when the
/// kinds match.
fn push_merged(segments: &mut Vec<DiffSegment>, text: String, kind: SegmentKind) {
    if let Some(last) = segments.last_mut() {
        if last.kind == kind {
            last.text.push_str(&text);
            return;
        }
    }
    segments.push(DiffSegment { text, kind });
}

/// LCS alignment over token slices, in original/revised order.
fn lcs_diff(left: &[&str], right: &[&str]) -> Vec<DiffOp> {
    let n = left.len();
    let m = right.len();

    if n == 0 {
        return (0..m).map(DiffOp::Insert).collect();
    }
    if m == 0 {
        return (0..n).map(DiffOp::Delete).collect();
    }

    // dp[i][j] = LCS length of left[0..i] and right[0..j]
    let mut dp = vec![vec![0usize; m + 1]; n + 1];
    for i in 1..=n {
        for j in 1..=m {
            dp[i][j] = if left[i - 1] == right[j - 1] {
                dp[i - 1][j - 1] + 1
            } else {
                dp[i - 1][j].max(dp[i][j - 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(n + m);
    let mut i = n;
    let mut j = m;
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && left[i - 1] == right[j - 1] {
            ops.push(DiffOp::Equal(i - 1, j - 1));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || dp[i][j - 1] >= dp[i - 1][j]) {
            ops.push(DiffOp::Insert(j - 1));
            j -= 1;
        } else {
            ops.push(DiffOp::Delete(i - 1));
            i -= 1;
        }
    }
    ops.reverse();
    ops
}

/// Concatenate the unchanged and deleted segments: the original text.
pub fn reconstruct_original(segments: &[DiffSegment]) -> String {
    segments
        .iter()
        .filter(|s| s.kind != SegmentKind::Inserted)
        .map(|s| s.text.as_str())
        .collect()
}

/// Concatenate the unchanged and inserted segments: the revised text.
pub fn reconstruct_revised(segments: &[DiffSegment]) -> String {
    segments
        .iter()
        .filter(|s| s.kind != SegmentKind::Deleted)
        .map(|s| s.text.as_str())
        .collect()
}

/// Render segments as human-readable markup: deletions wrapped in `[-…-]`,
/// insertions in `{+…+}`.
pub fn render_markup(segments: &[DiffSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment.kind {
            SegmentKind::Unchanged => out.push_str(&segment.text),
            SegmentKind::Deleted => {
                out.push_str("[-");
                out.push_str(&segment.text);
                out.push_str("-]");
            }
            SegmentKind::Inserted => {
                out.push_str("{+");
                out.push_str(&segment.text);
                out.push_str("+}");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip(original: &str, revised: &str) {
        let segments = RedlineRenderer::new().render(original, revised);
        assert_eq!(reconstruct_original(&segments), original);
        assert_eq!(reconstruct_revised(&segments), revised);
    }

    #[test]
    fn identical_texts_yield_one_unchanged_segment() {
        let segments = RedlineRenderer::new().render("hello world", "hello world");
        assert_eq!(
            segments,
            vec![DiffSegment::new("hello world", SegmentKind::Unchanged)]
        );
    }

    #[test]
    fn word_replacement() {
        let segments =
            RedlineRenderer::new().render("The Company shall deliver", "The Company may deliver");
        assert!(segments
            .iter()
            .any(|s| s.kind == SegmentKind::Deleted && s.text == "shall"));
        assert!(segments
            .iter()
            .any(|s| s.kind == SegmentKind::Inserted && s.text == "may"));
        assert_round_trip("The Company shall deliver", "The Company may deliver");
    }

    #[test]
    fn deletions_precede_insertions_at_an_edit_point() {
        let segments = RedlineRenderer::new().render("a shall b", "a may b");
        let kinds: Vec<SegmentKind> = segments.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SegmentKind::Unchanged,
                SegmentKind::Deleted,
                SegmentKind::Inserted,
                SegmentKind::Unchanged,
            ]
        );
    }

    #[test]
    fn round_trip_empty_and_one_sided() {
        assert_round_trip("", "");
        assert_round_trip("entire clause removed", "");
        assert_round_trip("", "entire clause added");
    }

    #[test]
    fn round_trip_disjoint_texts() {
        assert_round_trip("alpha beta gamma", "delta epsilon zeta");
    }

    #[test]
    fn round_trip_preserves_whitespace_and_punctuation() {
        assert_round_trip(
            "Vendor  shall respond, within thirty (30) days.",
            "Vendor must respond,  within sixty (60) days!",
        );
    }

    #[test]
    fn markup_rendering() {
        let segments = RedlineRenderer::new().render("a shall b", "a may b");
        insta::assert_snapshot!(render_markup(&segments), @"a [-shall-]{+may+} b");
    }

    #[test]
    fn markup_rendering_disjoint() {
        // The single interior space is common to both sides, so each word is
        // replaced independently around it.
        let segments = RedlineRenderer::new().render("old text", "new words");
        insta::assert_snapshot!(render_markup(&segments), @"[-old-]{+new+} [-text-]{+words+}");
    }
}
