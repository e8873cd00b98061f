//! Result fusion via Reciprocal Rank Fusion (RRF)
//!
//! Combines rankings from multiple retrieval methods without requiring
//! comparable score scales: each list contributes 1/(k + rank) for every
//! chunk it contains.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Retrieval method that produced a ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMethod {
    Dense,
    Sparse,
}

impl fmt::Display for RetrievalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dense => f.write_str("dense"),
            Self::Sparse => f.write_str("sparse"),
        }
    }
}

/// RRF parameters
#[derive(Debug, Clone)]
pub struct RrfConfig {
    /// Rank constant (conventionally 60)
    pub k: usize,
}

impl Default for RrfConfig {
    fn default() -> Self {
        Self { k: 60 }
    }
}

/// One entry of a single method's ranking
#[derive(Debug, Clone)]
pub struct RankedEntry {
    /// Chunk index into the bundle
    pub index: usize,
    /// 1-indexed rank within the method's list
    pub rank: usize,
    pub original_score: f32,
    pub method: RetrievalMethod,
}

/// A chunk's fused standing across all rankings
#[derive(Debug, Clone)]
pub struct FusedResult {
    pub index: usize,
    pub score: f32,
    pub methods: Vec<RetrievalMethod>,
}

/// Convert one method's (index, score) ranking into ranked entries.
pub fn to_ranked(results: &[(usize, f32)], method: RetrievalMethod) -> Vec<RankedEntry> {
    results
        .iter()
        .enumerate()
        .map(|(rank, (index, score))| RankedEntry {
            index: *index,
            rank: rank + 1,
            original_score: *score,
            method,
        })
        .collect()
}

/// Fuse ranked lists: score = Σ over lists containing the chunk of
/// 1/(k + rank). Chunks present in only one list still receive that list's
/// contribution. Output is sorted best first; equal scores order by lower
/// chunk index, never by map iteration order.
pub fn reciprocal_rank_fusion(
    ranked_lists: &[Vec<RankedEntry>],
    config: &RrfConfig,
) -> Vec<FusedResult> {
    let mut fused: HashMap<usize, FusedResult> = HashMap::new();

    for list in ranked_lists {
        for entry in list {
            let contribution = 1.0 / (config.k as f32 + entry.rank as f32);
            fused
                .entry(entry.index)
                .and_modify(|f| {
                    f.score += contribution;
                    if !f.methods.contains(&entry.method) {
                        f.methods.push(entry.method);
                    }
                })
                .or_insert_with(|| FusedResult {
                    index: entry.index,
                    score: contribution,
                    methods: vec![entry.method],
                });
        }
    }

    let mut results: Vec<FusedResult> = fused.into_values().collect();
    results.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rrf_favors_chunks_in_both_lists() {
        let dense = to_ranked(&[(0, 0.95), (1, 0.80), (2, 0.70)], RetrievalMethod::Dense);
        let sparse = to_ranked(&[(1, 5.2), (0, 4.1), (3, 3.5)], RetrievalMethod::Sparse);

        let fused = reciprocal_rank_fusion(&[dense, sparse], &RrfConfig::default());

        let top_two: Vec<usize> = fused.iter().take(2).map(|f| f.index).collect();
        assert!(top_two.contains(&0));
        assert!(top_two.contains(&1));

        let chunk0 = fused.iter().find(|f| f.index == 0).unwrap();
        assert_eq!(chunk0.methods.len(), 2);
    }

    #[test]
    fn test_single_list_membership_still_scores() {
        let dense = to_ranked(&[(0, 0.9)], RetrievalMethod::Dense);
        let sparse = to_ranked(&[(7, 3.0)], RetrievalMethod::Sparse);

        let fused = reciprocal_rank_fusion(&[dense, sparse], &RrfConfig { k: 60 });

        let lone = fused.iter().find(|f| f.index == 7).unwrap();
        assert!((lone.score - 1.0 / 61.0).abs() < 1e-6);
        assert_eq!(lone.methods, vec![RetrievalMethod::Sparse]);
    }

    #[test]
    fn test_rrf_scores_are_exact() {
        let dense = to_ranked(&[(0, 1.0), (1, 0.5)], RetrievalMethod::Dense);
        let sparse = to_ranked(&[(1, 9.0), (0, 8.0)], RetrievalMethod::Sparse);

        let fused = reciprocal_rank_fusion(&[dense, sparse], &RrfConfig { k: 60 });

        // Both chunks: one rank-1 and one rank-2 contribution
        let expected = 1.0 / 61.0 + 1.0 / 62.0;
        for f in &fused {
            assert!((f.score - expected).abs() < 1e-6);
        }
        // Equal scores tie-break on the lower index
        assert_eq!(fused[0].index, 0);
        assert_eq!(fused[1].index, 1);
    }

    #[test]
    fn test_empty_lists_fuse_to_empty() {
        let fused = reciprocal_rank_fusion(&[Vec::new(), Vec::new()], &RrfConfig::default());
        assert!(fused.is_empty());
    }

    #[test]
    fn test_fusion_is_deterministic() {
        let dense = to_ranked(&[(3, 0.9), (1, 0.8), (2, 0.7)], RetrievalMethod::Dense);
        let sparse = to_ranked(&[(2, 2.0), (3, 1.0)], RetrievalMethod::Sparse);

        let a = reciprocal_rank_fusion(&[dense.clone(), sparse.clone()], &RrfConfig::default());
        let b = reciprocal_rank_fusion(&[dense, sparse], &RrfConfig::default());

        let order_a: Vec<usize> = a.iter().map(|f| f.index).collect();
        let order_b: Vec<usize> = b.iter().map(|f| f.index).collect();
        assert_eq!(order_a, order_b);
    }
}
