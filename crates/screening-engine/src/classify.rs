//! # Classifier
//!
//! Pure mapping from candidates and thresholds to a decision. First
//! matching rule wins:
//!
//! | # | Condition | Decision |
//! |---|-----------|----------|
//! | 1 | no candidates | `clear`, top score 0.0 |
//! | 2 | `top_score >= block` | `block` |
//! | 3 | `top_score >= review` | `review` |
//! | 4 | otherwise | `clear` |
//!
//! Reasons are ordered: top score, best match, sanctions programs of the
//! best match (up to three), candidate count, decision line citing the
//! threshold, recommended action. Review decisions may carry trailing
//! annotations (enhanced scrutiny, cross-dataset confirmation). Annotations
//! never change the decision.

use std::collections::BTreeSet;

use screening_core::{MatchCandidate, RiskLevel, ScreeningDecision, Thresholds};

use crate::aggregate::rank_order;

/// Programs cited from the best match.
const MAX_PROGRAMS_CITED: usize = 3;

/// Review-band candidates needed for the enhanced scrutiny annotation.
const ENHANCED_SCRUTINY_MIN: usize = 3;

/// Distinct datasets at or above review needed for cross-dataset confirmation.
const CROSS_DATASET_MIN: usize = 2;

const CLEARED_ACTION: &str = "Person cleared for transaction processing.";

/// Classifier output.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub decision: ScreeningDecision,
    pub risk_level: RiskLevel,
    pub top_score: f64,
    pub reasons: Vec<String>,
}

/// Classify a candidate set. Input order does not matter.
pub fn classify(candidates: &[MatchCandidate], thresholds: &Thresholds) -> Classification {
    let Some(best) = candidates.iter().min_by(|a, b| rank_order(a, b)) else {
        return Classification {
            decision: ScreeningDecision::Clear,
            risk_level: RiskLevel::None,
            top_score: 0.0,
            reasons: vec![
                "No candidate matches found in the screened watchlist datasets.".to_string(),
                CLEARED_ACTION.to_string(),
            ],
        };
    };

    let top_score = best.score;
    let decision = if top_score >= thresholds.block() {
        ScreeningDecision::Block
    } else if top_score >= thresholds.review() {
        ScreeningDecision::Review
    } else {
        ScreeningDecision::Clear
    };

    let mut reasons = vec![
        format!("Top match score: {top_score:.3} (scale 0.0-1.0, higher is a stronger match)"),
        format!(
            "Best match: '{}' from {} (entity id: {})",
            best.caption,
            best.dataset.as_str().to_ascii_uppercase(),
            best.entity_id
        ),
    ];
    let programs = best.programs();
    if !programs.is_empty() {
        let cited: Vec<&str> = programs
            .iter()
            .take(MAX_PROGRAMS_CITED)
            .map(String::as_str)
            .collect();
        reasons.push(format!("Sanctions programs: {}", cited.join(", ")));
    }
    reasons.push(format!(
        "Total candidate matches evaluated: {}",
        candidates.len()
    ));
    decision_lines(decision, top_score, thresholds, &mut reasons);

    if decision == ScreeningDecision::Review {
        reasons.extend(review_annotations(candidates, thresholds));
    }

    Classification {
        decision,
        risk_level: thresholds.risk_level(top_score),
        top_score,
        reasons,
    }
}

fn decision_lines(
    decision: ScreeningDecision,
    top_score: f64,
    thresholds: &Thresholds,
    reasons: &mut Vec<String>,
) {
    match decision {
        ScreeningDecision::Block => {
            reasons.push(format!(
                "BLOCK decision: score {top_score:.3} >= block threshold {:.2}",
                thresholds.block()
            ));
            reasons.push(
                "Action required: hard hold on the transaction, immediate compliance review, \
                 gather additional KYC documentation."
                    .to_string(),
            );
        }
        ScreeningDecision::Review => {
            reasons.push(format!(
                "REVIEW decision: score {top_score:.3} >= review threshold {:.2} but < block threshold {:.2}",
                thresholds.review(),
                thresholds.block()
            ));
            reasons.push(
                "Action required: soft hold on the transaction, manual compliance review \
                 within 48 hours, request additional identity documents if needed."
                    .to_string(),
            );
        }
        ScreeningDecision::Clear => {
            if top_score >= thresholds.info() {
                reasons.push(format!(
                    "CLEAR decision: score {top_score:.3} < review threshold {:.2}",
                    thresholds.review()
                ));
                reasons.push(
                    "Low-confidence matches logged for monitoring; no action required.".to_string(),
                );
            } else {
                reasons.push(format!(
                    "CLEAR decision: all scores below information threshold {:.2}",
                    thresholds.info()
                ));
            }
            reasons.push(CLEARED_ACTION.to_string());
        }
    }
}

fn review_annotations(candidates: &[MatchCandidate], thresholds: &Thresholds) -> Vec<String> {
    let mut notes = Vec::new();

    let in_review_band = candidates
        .iter()
        .filter(|c| c.score >= thresholds.review() && c.score < thresholds.block())
        .count();
    if in_review_band >= ENHANCED_SCRUTINY_MIN {
        notes.push(format!(
            "Enhanced scrutiny: {in_review_band} matches above review threshold; \
             multiple candidates warrant careful manual review."
        ));
    }

    let datasets: BTreeSet<&str> = candidates
        .iter()
        .filter(|c| c.score >= thresholds.review())
        .map(|c| c.dataset.as_str())
        .collect();
    if datasets.len() >= CROSS_DATASET_MIN {
        let names: Vec<&str> = datasets.into_iter().collect();
        notes.push(format!(
            "Cross-dataset confirmation: candidate appears in {} datasets ({}).",
            names.len(),
            names.join(", ")
        ));
    }

    notes
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use screening_core::DatasetScope;
    use std::collections::BTreeMap;

    fn candidate_set() -> impl Strategy<Value = Vec<MatchCandidate>> {
        prop::collection::vec((0u8..3, 0u16..500, 0.0f64..=1.0), 0..12).prop_map(|raw| {
            raw.into_iter()
                .map(|(d, id, score)| MatchCandidate {
                    dataset: DatasetScope::new(format!("ds{d}")).unwrap(),
                    entity_id: format!("e{id}"),
                    caption: format!("C{id}"),
                    score,
                    is_match: false,
                    properties: BTreeMap::new(),
                    source_urls: Vec::new(),
                })
                .collect()
        })
    }

    fn thresholds() -> impl Strategy<Value = Thresholds> {
        (0.0f64..0.5, 0.5f64..0.8, 0.8f64..=1.0)
            .prop_filter_map("ordered thresholds", |(i, r, b)| Thresholds::new(i, r, b).ok())
    }

    proptest! {
        /// Identical inputs give identical output, including reason order.
        #[test]
        fn deterministic(cands in candidate_set(), t in thresholds()) {
            prop_assert_eq!(classify(&cands, &t), classify(&cands, &t));
        }

        /// Input order does not affect the outcome.
        #[test]
        fn order_independent(cands in candidate_set(), t in thresholds()) {
            let mut reversed = cands.clone();
            reversed.reverse();
            let a = classify(&cands, &t);
            let b = classify(&reversed, &t);
            prop_assert_eq!(a.decision, b.decision);
            prop_assert_eq!(a.top_score, b.top_score);
            prop_assert_eq!(a.reasons, b.reasons);
        }

        /// Raising any one score never lowers the decision.
        #[test]
        fn monotone_in_scores(
            cands in candidate_set(),
            t in thresholds(),
            pick in any::<prop::sample::Index>(),
            bump in 0.0f64..=1.0,
        ) {
            prop_assume!(!cands.is_empty());
            let before = classify(&cands, &t);
            let mut raised = cands.clone();
            let i = pick.index(raised.len());
            raised[i].score = (raised[i].score + bump).min(1.0);
            let after = classify(&raised, &t);
            prop_assert!(after.decision >= before.decision);
            prop_assert!(after.risk_level >= before.risk_level);
            prop_assert!(after.top_score >= before.top_score);
        }

        /// Top score is the maximum candidate score.
        #[test]
        fn top_score_is_max(cands in candidate_set(), t in thresholds()) {
            let max = cands.iter().map(|c| c.score).fold(0.0, f64::max);
            prop_assert_eq!(classify(&cands, &t).top_score, max);
        }
    }
}
