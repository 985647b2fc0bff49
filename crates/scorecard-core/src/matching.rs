//! Pairing found gaps with expected gaps for one test case.
//!
//! A found gap corresponds to an expected gap when two predicates hold:
//!
//! 1. **Norm match**: the found gap relates to the expected norm, judged
//!    according to a [`NormMatch`] rule.
//! 2. **Keyword match**: at least one expected keyword occurs in the found
//!    gap's description or recommendation (case-insensitive substring).
//!
//! Pairs form a partial injective matching: every expected index and every
//! found index is used at most once per case.
//!
//! # Strategies
//!
//! | Strategy | Behavior | Cost |
//! |----------|----------|------|
//! | [`MatchStrategy::Greedy`] | First unconsumed candidate wins | O(expected × found) |
//! | [`MatchStrategy::Maximum`] | Augmenting paths, most pairs | O(expected × edges) |
//!
//! Greedy is the scorecard's reference behavior. It can leave a pair on the
//! table when an early expected gap consumes a candidate a later one needed;
//! Maximum recovers such pairs. Both are deterministic given input order.
//!
//! # Example
//!
//! ```
//! use scorecard_core::matching::GapMatcher;
//! use scorecard_core::types::{ExpectedGap, FoundGap};
//!
//! let expected = vec![ExpectedGap::new("NR-12", ["proteção", "máquina"])];
//! let found = vec![FoundGap::new("12", "Falta proteção coletiva em máquina X", "")];
//!
//! let outcome = GapMatcher::default().match_gaps(&expected, &found);
//! assert_eq!(outcome.true_positives(), 1);
//! ```

use crate::norm::{codes_match, normalize_optional, normalize_norm_code};
use crate::types::{ExpectedGap, FoundGap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// Configuration
// ============================================================================

/// Rule deciding whether a found gap relates to an expected norm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormMatch {
    /// Found code equals expected code.
    Strict,
    /// Found code or any evidence code equals expected code.
    Evidence,
    /// As [`NormMatch::Evidence`], or the expected code occurs anywhere in
    /// the uppercased description.
    ///
    /// This credits a gap whose structured code is wrong but whose text
    /// cites the right norm. Short codes such as "6" can also match
    /// unrelated digits in the description.
    #[default]
    Loose,
}

/// Algorithm used to assign found gaps to expected gaps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// First-match-wins scan in input order.
    #[default]
    Greedy,
    /// Maximum-cardinality bipartite matching.
    Maximum,
}

/// Matcher configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub norm_match: NormMatch,
    pub strategy: MatchStrategy,
}

// ============================================================================
// Outcome
// ============================================================================

/// Result of matching one test case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Indices into the expected gaps that were matched
    pub matched_expected: BTreeSet<usize>,
    /// Indices into the found gaps that were matched
    pub matched_found: BTreeSet<usize>,
    /// (expected index, found index) pairs, ordered by expected index
    pub pairs: Vec<(usize, usize)>,
}

impl MatchOutcome {
    fn from_pairs(mut pairs: Vec<(usize, usize)>) -> Self {
        pairs.sort_unstable();
        Self {
            matched_expected: pairs.iter().map(|&(e, _)| e).collect(),
            matched_found: pairs.iter().map(|&(_, f)| f).collect(),
            pairs,
        }
    }

    /// Number of matched pairs.
    pub fn true_positives(&self) -> usize {
        self.matched_expected.len()
    }

    /// Found gap paired with the given expected gap, if any.
    pub fn found_for(&self, expected_idx: usize) -> Option<usize> {
        self.pairs
            .iter()
            .find(|&&(e, _)| e == expected_idx)
            .map(|&(_, f)| f)
    }
}

// ============================================================================
// Matcher
// ============================================================================

/// Expected gap with its comparison forms computed once.
struct PreparedExpected {
    norm: String,
    keywords: Vec<String>,
}

/// Found gap with its comparison forms computed once.
struct PreparedFound {
    norm: String,
    evidence_norms: Vec<String>,
    description_upper: String,
    content_lower: String,
}

impl PreparedExpected {
    fn new(gap: &ExpectedGap) -> Self {
        Self {
            norm: normalize_norm_code(&gap.norm),
            keywords: gap.keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

impl PreparedFound {
    fn new(gap: &FoundGap) -> Self {
        Self {
            norm: normalize_optional(gap.norm_code.as_deref()),
            evidence_norms: gap
                .evidence
                .iter()
                .map(|e| normalize_optional(e.norm_code.as_deref()))
                .collect(),
            description_upper: gap.description.to_uppercase(),
            content_lower: format!("{} {}", gap.description, gap.recommendation).to_lowercase(),
        }
    }
}

/// Decides which found gaps correspond to which expected gaps.
#[derive(Debug, Clone, Copy, Default)]
pub struct GapMatcher {
    config: MatchConfig,
}

impl GapMatcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> MatchConfig {
        self.config
    }

    /// Matches one case's found gaps against its expected gaps.
    pub fn match_gaps(&self, expected: &[ExpectedGap], found: &[FoundGap]) -> MatchOutcome {
        let expected: Vec<_> = expected.iter().map(PreparedExpected::new).collect();
        let found: Vec<_> = found.iter().map(PreparedFound::new).collect();

        let pairs = match self.config.strategy {
            MatchStrategy::Greedy => self.greedy(&expected, &found),
            MatchStrategy::Maximum => self.maximum(&expected, &found),
        };
        MatchOutcome::from_pairs(pairs)
    }

    fn accepts(&self, expected: &PreparedExpected, found: &PreparedFound) -> bool {
        self.norm_matches(expected, found) && keyword_matches(expected, found)
    }

    fn norm_matches(&self, expected: &PreparedExpected, found: &PreparedFound) -> bool {
        // An unknown expected norm cannot relate to anything
        if expected.norm.is_empty() {
            return false;
        }

        if codes_match(&expected.norm, &found.norm) {
            return true;
        }

        match self.config.norm_match {
            NormMatch::Strict => false,
            NormMatch::Evidence => evidence_matches(expected, found),
            NormMatch::Loose => {
                found.description_upper.contains(&expected.norm)
                    || evidence_matches(expected, found)
            }
        }
    }

    fn greedy(
        &self,
        expected: &[PreparedExpected],
        found: &[PreparedFound],
    ) -> Vec<(usize, usize)> {
        let mut consumed = vec![false; found.len()];
        let mut pairs = Vec::new();

        for (i, exp) in expected.iter().enumerate() {
            let candidate = found
                .iter()
                .enumerate()
                .find(|(j, f)| !consumed[*j] && self.accepts(exp, f));

            if let Some((j, _)) = candidate {
                consumed[j] = true;
                pairs.push((i, j));
            }
        }

        pairs
    }

    /// Kuhn's augmenting path algorithm over the predicate graph.
    fn maximum(
        &self,
        expected: &[PreparedExpected],
        found: &[PreparedFound],
    ) -> Vec<(usize, usize)> {
        let adjacency: Vec<Vec<usize>> = expected
            .iter()
            .map(|exp| {
                found
                    .iter()
                    .enumerate()
                    .filter(|(_, f)| self.accepts(exp, f))
                    .map(|(j, _)| j)
                    .collect()
            })
            .collect();

        // owner[j] = expected index currently holding found gap j
        let mut owner: Vec<Option<usize>> = vec![None; found.len()];
        for i in 0..expected.len() {
            let mut visited = vec![false; found.len()];
            augment(i, &adjacency, &mut owner, &mut visited);
        }

        owner
            .iter()
            .enumerate()
            .filter_map(|(j, o)| o.map(|i| (i, j)))
            .collect()
    }
}

fn evidence_matches(expected: &PreparedExpected, found: &PreparedFound) -> bool {
    found
        .evidence_norms
        .iter()
        .any(|code| codes_match(&expected.norm, code))
}

fn keyword_matches(expected: &PreparedExpected, found: &PreparedFound) -> bool {
    expected
        .keywords
        .iter()
        .any(|kw| found.content_lower.contains(kw.as_str()))
}

fn augment(
    i: usize,
    adjacency: &[Vec<usize>],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &j in &adjacency[i] {
        if visited[j] {
            continue;
        }
        visited[j] = true;
        let free = match owner[j] {
            None => true,
            Some(holder) => augment(holder, adjacency, owner, visited),
        };
        if free {
            owner[j] = Some(i);
            return true;
        }
    }
    false
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Evidence;

    fn machine_guarding() -> ExpectedGap {
        ExpectedGap::new("NR-12", ["proteção", "máquina"])
    }

    fn matcher(norm_match: NormMatch, strategy: MatchStrategy) -> GapMatcher {
        GapMatcher::new(MatchConfig {
            norm_match,
            strategy,
        })
    }

    fn assert_injective(outcome: &MatchOutcome) {
        assert_eq!(outcome.matched_expected.len(), outcome.pairs.len());
        assert_eq!(outcome.matched_found.len(), outcome.pairs.len());
    }

    #[test]
    fn test_code_and_keyword_match() {
        let expected = vec![machine_guarding()];
        let found = vec![FoundGap::new("12", "Falta proteção coletiva em máquina X", "")];

        let outcome = GapMatcher::default().match_gaps(&expected, &found);
        assert_eq!(outcome.true_positives(), 1);
        assert_eq!(outcome.pairs, vec![(0, 0)]);
    }

    #[test]
    fn test_description_citation_satisfies_loose_norm_match() {
        // Structured code points at NR-18, but the text cites NR-12
        let expected = vec![machine_guarding()];
        let found = vec![FoundGap::new("18", "proteção de máquina exigida pela NR-12", "")];

        let loose = GapMatcher::default().match_gaps(&expected, &found);
        assert_eq!(loose.true_positives(), 1);

        let evidence =
            matcher(NormMatch::Evidence, MatchStrategy::Greedy).match_gaps(&expected, &found);
        assert_eq!(evidence.true_positives(), 0);

        let strict =
            matcher(NormMatch::Strict, MatchStrategy::Greedy).match_gaps(&expected, &found);
        assert_eq!(strict.true_positives(), 0);
    }

    #[test]
    fn test_evidence_code_satisfies_norm_match() {
        let expected = vec![machine_guarding()];
        let found = vec![FoundGap::new("NR-18", "Falta proteção em máquina", "")
            .with_evidence(vec![Evidence::new("NR-06"), Evidence::new("nr12")])];

        assert_eq!(GapMatcher::default().match_gaps(&expected, &found).true_positives(), 1);
        assert_eq!(
            matcher(NormMatch::Evidence, MatchStrategy::Greedy)
                .match_gaps(&expected, &found)
                .true_positives(),
            1
        );
        assert_eq!(
            matcher(NormMatch::Strict, MatchStrategy::Greedy)
                .match_gaps(&expected, &found)
                .true_positives(),
            0
        );
    }

    #[test]
    fn test_keyword_in_recommendation_counts() {
        let expected = vec![ExpectedGap::new("NR-06", ["CA"])];
        let found = vec![FoundGap::new("NR-06", "EPIs sem registro", "Exigir ca válido")];

        assert_eq!(GapMatcher::default().match_gaps(&expected, &found).true_positives(), 1);
    }

    #[test]
    fn test_keyword_missing_rejects_match() {
        let expected = vec![machine_guarding()];
        let found = vec![FoundGap::new(
            "NR-12",
            "Ruído acima do limite",
            "Instalar enclausuramento",
        )];

        let outcome = GapMatcher::default().match_gaps(&expected, &found);
        assert_eq!(outcome.true_positives(), 0);
        assert!(outcome.pairs.is_empty());
    }

    #[test]
    fn test_keyword_does_not_span_description_and_recommendation() {
        let expected = vec![ExpectedGap::new("NR-06", ["epi"])];
        let found = vec![FoundGap::new("NR-06", "sem e", "pi")];

        assert_eq!(GapMatcher::default().match_gaps(&expected, &found).true_positives(), 0);
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let expected = vec![ExpectedGap::new("NR-35", ["TRABALHO EM ALTURA"])];
        let found = vec![FoundGap::new(
            "35",
            "Falta análise de risco para trabalho em altura",
            "",
        )];

        assert_eq!(GapMatcher::default().match_gaps(&expected, &found).true_positives(), 1);
    }

    #[test]
    fn test_empty_expected_norm_never_matches() {
        let expected = vec![ExpectedGap::new("", ["proteção"])];
        let found = vec![FoundGap {
            norm_code: None,
            description: "proteção".to_string(),
            recommendation: String::new(),
            evidence: vec![Evidence::default()],
        }];

        assert_eq!(GapMatcher::default().match_gaps(&expected, &found).true_positives(), 0);
    }

    #[test]
    fn test_duplicate_expected_consumes_single_candidate() {
        let expected = vec![machine_guarding(), machine_guarding()];
        let found = vec![FoundGap::new("12", "Falta proteção coletiva em máquina X", "")];

        let outcome = GapMatcher::default().match_gaps(&expected, &found);
        assert_eq!(outcome.true_positives(), 1);
        assert_eq!(outcome.pairs, vec![(0, 0)]);
        assert_eq!(outcome.found_for(1), None);
        assert_injective(&outcome);
    }

    #[test]
    fn test_greedy_takes_first_candidate_in_order() {
        let expected = vec![machine_guarding()];
        let found = vec![
            FoundGap::new("NR-10", "Instalações elétricas", ""),
            FoundGap::new("NR-12", "proteção ausente", ""),
            FoundGap::new("NR-12", "máquina sem proteção", ""),
        ];

        let outcome = GapMatcher::default().match_gaps(&expected, &found);
        assert_eq!(outcome.pairs, vec![(0, 1)]);
    }

    #[test]
    fn test_greedy_order_dependence_recovered_by_maximum() {
        // Expected 0 accepts both candidates, expected 1 only the first.
        // Greedy hands the first to expected 0 and strands expected 1.
        let expected = vec![
            ExpectedGap::new("NR-12", ["proteção"]),
            ExpectedGap::new("NR-12", ["máquina"]),
        ];
        let found = vec![
            FoundGap::new("NR-12", "proteção de máquina", ""),
            FoundGap::new("NR-12", "proteção de serra", ""),
        ];

        let greedy = GapMatcher::default().match_gaps(&expected, &found);
        assert_eq!(greedy.pairs, vec![(0, 0)]);

        let maximum =
            matcher(NormMatch::Loose, MatchStrategy::Maximum).match_gaps(&expected, &found);
        assert_eq!(maximum.pairs, vec![(0, 1), (1, 0)]);
        assert_injective(&maximum);
    }

    #[test]
    fn test_maximum_never_below_greedy() {
        let expected = vec![
            ExpectedGap::new("NR-06", ["epi"]),
            ExpectedGap::new("NR-06", ["ca"]),
            ExpectedGap::new("NR-35", ["altura"]),
        ];
        let found = vec![
            FoundGap::new("NR-06", "epi sem ca", ""),
            FoundGap::new("NR-06", "ca vencido", ""),
            FoundGap::new("NR-33", "espaço confinado", ""),
        ];

        let greedy = GapMatcher::default().match_gaps(&expected, &found);
        let maximum =
            matcher(NormMatch::Loose, MatchStrategy::Maximum).match_gaps(&expected, &found);
        assert!(maximum.true_positives() >= greedy.true_positives());
        assert_eq!(maximum.true_positives(), 2);
    }

    #[test]
    fn test_empty_inputs() {
        let outcome = GapMatcher::default().match_gaps(&[], &[]);
        assert_eq!(outcome, MatchOutcome::default());

        let outcome = GapMatcher::default().match_gaps(&[machine_guarding()], &[]);
        assert_eq!(outcome.true_positives(), 0);

        let found = vec![FoundGap::new("12", "proteção de máquina", "")];
        let outcome = GapMatcher::default().match_gaps(&[], &found);
        assert_eq!(outcome.true_positives(), 0);
    }
}
