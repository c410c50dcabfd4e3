//! Fuzzy place-name resolution.
//!
//! [`RegionResolver::resolve`] scores a free-text query against every
//! candidate name and returns the best one with a 0–100 confidence.  It never
//! rejects a match itself: the caller decides what confidence is good enough.
//!
//! Scoring is pluggable through [`Scorer`]; the default
//! [`EditDistanceScorer`] is Levenshtein-based and tolerates typos,
//! reordered words and partial names.

use std::collections::BTreeSet;

use crate::catalog::normalize_name;

// ── Scorer ────────────────────────────────────────────────────────────────────

/// Similarity metric between a normalised query and a candidate name.
pub trait Scorer: Send + Sync {
    /// Similarity in `0..=100`; 100 means identical.
    fn score(&self, query: &str, candidate: &str) -> u8;
}

/// Normalised Levenshtein similarity, taking the best of three views of the
/// strings:
///
/// - the strings as given;
/// - their whitespace-separated tokens sorted and re-joined, so word order
///   does not matter (`"east andheri"` ≈ `"andheri east"`);
/// - a token-set comparison, so naming only some of the words of an area
///   still matches it (`"juhu"` ≈ `"juhu tara road"`).  This view is capped
///   at 95 so an exact name always outranks a partial one.
///
/// Scores are rounded to the nearest integer.
pub struct EditDistanceScorer;

const TOKEN_SET_SCALE: f64 = 0.95;

impl Scorer for EditDistanceScorer {
    fn score(&self, query: &str, candidate: &str) -> u8 {
        let direct = strsim::normalized_levenshtein(query, candidate);
        let sorted = strsim::normalized_levenshtein(&sort_tokens(query), &sort_tokens(candidate));
        let set = token_set_similarity(query, candidate) * TOKEN_SET_SCALE;
        to_percent(direct.max(sorted).max(set))
    }
}

fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Similarity of the shared tokens against each side.  1.0 when one side's
/// tokens are a subset of the other's; 0.0 when no token is shared.
fn token_set_similarity(a: &str, b: &str) -> f64 {
    let a: BTreeSet<&str> = a.split_whitespace().collect();
    let b: BTreeSet<&str> = b.split_whitespace().collect();

    let shared: Vec<&str> = a.intersection(&b).copied().collect();
    if shared.is_empty() {
        return 0.0;
    }
    let only_a: Vec<&str> = a.difference(&b).copied().collect();
    let only_b: Vec<&str> = b.difference(&a).copied().collect();
    if only_a.is_empty() || only_b.is_empty() {
        return 1.0;
    }

    let shared = shared.join(" ");
    let with_a = format!("{shared} {}", only_a.join(" "));
    let with_b = format!("{shared} {}", only_b.join(" "));
    strsim::normalized_levenshtein(&shared, &with_a)
        .max(strsim::normalized_levenshtein(&shared, &with_b))
        .max(strsim::normalized_levenshtein(&with_a, &with_b))
}

fn to_percent(similarity: f64) -> u8 {
    (similarity.clamp(0.0, 1.0) * 100.0).round() as u8
}

// ── Resolver ──────────────────────────────────────────────────────────────────

/// Best candidate for a query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution<'a> {
    /// `None` only when there were no candidates.
    pub best_match: Option<&'a str>,
    /// 0 when there were no candidates.
    pub confidence: u8,
}

impl Resolution<'_> {
    /// `true` if a candidate was found with at least `min_confidence`.
    pub fn is_usable(&self, min_confidence: u8) -> bool {
        self.best_match.is_some() && self.confidence >= min_confidence
    }
}

/// Maps free text onto the closest known name.
pub struct RegionResolver<S: Scorer = EditDistanceScorer> {
    scorer: S,
}

impl RegionResolver<EditDistanceScorer> {
    pub fn new() -> Self {
        Self { scorer: EditDistanceScorer }
    }
}

impl Default for RegionResolver<EditDistanceScorer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scorer> RegionResolver<S> {
    pub fn with_scorer(scorer: S) -> Self {
        Self { scorer }
    }

    /// Score `query` (trimmed and lower-cased first) against each candidate
    /// and return the highest-scoring one.
    ///
    /// Ties go to the candidate that comes first, so the result is
    /// deterministic for a fixed candidate order.  Repeated candidates are
    /// harmless: a repeat can never beat its own first occurrence.
    pub fn resolve<'a, I>(&self, query: &str, candidates: I) -> Resolution<'a>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let query = normalize_name(query);
        let mut best = Resolution { best_match: None, confidence: 0 };

        for candidate in candidates {
            let score = self.scorer.score(&query, candidate);
            if best.best_match.is_none() || score > best.confidence {
                best = Resolution { best_match: Some(candidate), confidence: score };
                if score == 100 {
                    break;
                }
            }
        }
        best
    }
}
