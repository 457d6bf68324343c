//! # Candidate Aggregation
//!
//! Merges per-dataset candidate lists into one ranked set.
//!
//! - Identity is `(dataset, entity_id)`. The same entity id in two datasets
//!   is two candidates; there is no cross-dataset merging.
//! - Duplicates keep the highest score. On equal scores the first
//!   occurrence wins.
//! - Ranking is score descending, then `entity_id` ascending, then dataset
//!   ascending, which makes the order total.
//! - The full ranked list is kept for the audit record; the caller sees the
//!   first `max_matches`.

use std::cmp::Ordering;
use std::collections::HashMap;

use screening_client::DatasetCandidates;
use screening_core::MatchCandidate;

/// Merged, deduplicated, ranked candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidates {
    all: Vec<MatchCandidate>,
}

impl RankedCandidates {
    /// Every candidate considered, ranked.
    pub fn all(&self) -> &[MatchCandidate] {
        &self.all
    }

    /// The first `k` ranked candidates.
    pub fn top(&self, k: usize) -> &[MatchCandidate] {
        &self.all[..k.min(self.all.len())]
    }

    /// Highest score, 0.0 when empty.
    pub fn top_score(&self) -> f64 {
        self.all.first().map(|c| c.score).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn into_vec(self) -> Vec<MatchCandidate> {
        self.all
    }
}

/// Ranking order over candidates.
pub fn rank_order(a: &MatchCandidate, b: &MatchCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.entity_id.cmp(&b.entity_id))
        .then_with(|| a.dataset.cmp(&b.dataset))
}

/// Merge every dataset's candidates into one ranked set.
pub fn aggregate(per_dataset: impl IntoIterator<Item = DatasetCandidates>) -> RankedCandidates {
    let mut merged: Vec<MatchCandidate> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for batch in per_dataset {
        for candidate in batch.candidates {
            let key = (candidate.dataset.to_string(), candidate.entity_id.clone());
            match index.get(&key) {
                Some(&slot) => {
                    if candidate.score > merged[slot].score {
                        merged[slot] = candidate;
                    }
                }
                None => {
                    index.insert(key, merged.len());
                    merged.push(candidate);
                }
            }
        }
    }

    merged.sort_by(rank_order);
    RankedCandidates { all: merged }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use screening_core::DatasetScope;
    use std::collections::BTreeMap;

    fn candidates() -> impl Strategy<Value = Vec<(u8, u8, f64)>> {
        prop::collection::vec((0u8..3, 0u8..6, 0.0f64..=1.0), 0..24)
    }

    fn build(raw: &[(u8, u8, f64)]) -> Vec<DatasetCandidates> {
        (0u8..3)
            .map(|d| DatasetCandidates {
                dataset: DatasetScope::new(format!("ds{d}")).unwrap(),
                candidates: raw
                    .iter()
                    .filter(|(ds, _, _)| *ds == d)
                    .map(|(ds, id, score)| MatchCandidate {
                        dataset: DatasetScope::new(format!("ds{ds}")).unwrap(),
                        entity_id: format!("e{id}"),
                        caption: String::new(),
                        score: *score,
                        is_match: false,
                        properties: BTreeMap::new(),
                        source_urls: Vec::new(),
                    })
                    .collect(),
            })
            .collect()
    }

    proptest! {
        /// Output is sorted and free of duplicate keys.
        #[test]
        fn sorted_and_unique(raw in candidates()) {
            let ranked = aggregate(build(&raw));
            for pair in ranked.all().windows(2) {
                prop_assert_eq!(rank_order(&pair[0], &pair[1]), Ordering::Less);
            }
        }

        /// Each key keeps its maximum score and top_score is the global max.
        #[test]
        fn keeps_max_per_key(raw in candidates()) {
            let ranked = aggregate(build(&raw));
            for c in ranked.all() {
                let best = raw
                    .iter()
                    .filter(|(d, id, _)| format!("ds{d}") == c.dataset.as_str() && format!("e{id}") == c.entity_id)
                    .map(|(_, _, s)| *s)
                    .fold(f64::MIN, f64::max);
                prop_assert_eq!(c.score, best);
            }
            let global = raw.iter().map(|(_, _, s)| *s).fold(0.0, f64::max);
            prop_assert_eq!(ranked.top_score(), global);
        }
    }
}
