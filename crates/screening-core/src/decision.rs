//! # Decision Tiers and Thresholds
//!
//! [`ScreeningDecision`] is the actionable outcome; [`RiskLevel`] is a finer
//! grained tier reported alongside it. Both derive `Ord` in severity order so
//! callers can compare outcomes directly (`Clear < Review < Block`).

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Actionable screening outcome, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreeningDecision {
    /// No significant match; proceed.
    Clear,
    /// Possible match; manual review and soft hold.
    Review,
    /// High-confidence match; hard hold and escalation.
    Block,
}

impl ScreeningDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Review => "review",
            Self::Block => "block",
        }
    }
}

impl std::fmt::Display for ScreeningDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk tier derived from the top candidate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Below the information threshold (or no candidates).
    None,
    /// At or above the information threshold, below review.
    Low,
    /// In the lower half of the review band.
    Medium,
    /// In the upper half of the review band.
    High,
    /// At or above the block threshold.
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated score thresholds.
///
/// # Invariants
///
/// `0 <= info <= review < block <= 1`, all finite. Enforced by
/// [`Thresholds::new`] and by deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawThresholds")]
pub struct Thresholds {
    info: f64,
    review: f64,
    block: f64,
}

#[derive(Deserialize)]
struct RawThresholds {
    info: f64,
    review: f64,
    block: f64,
}

impl TryFrom<RawThresholds> for Thresholds {
    type Error = ValidationError;

    fn try_from(raw: RawThresholds) -> Result<Self, Self::Error> {
        Self::new(raw.info, raw.review, raw.block)
    }
}

impl Thresholds {
    pub const DEFAULT_INFO: f64 = 0.50;
    pub const DEFAULT_REVIEW: f64 = 0.75;
    pub const DEFAULT_BLOCK: f64 = 0.90;

    pub fn new(info: f64, review: f64, block: f64) -> Result<Self, ValidationError> {
        if ![info, review, block].iter().all(|v| v.is_finite()) {
            return Err(ValidationError::InvalidThresholds(
                "thresholds must be finite numbers".into(),
            ));
        }
        if !(0.0..=1.0).contains(&info)
            || !(0.0..=1.0).contains(&review)
            || !(0.0..=1.0).contains(&block)
        {
            return Err(ValidationError::InvalidThresholds(format!(
                "thresholds must lie in [0, 1] (info={info}, review={review}, block={block})"
            )));
        }
        if review >= block {
            return Err(ValidationError::InvalidThresholds(format!(
                "review_score {review} must be below block_score {block}"
            )));
        }
        if info > review {
            return Err(ValidationError::InvalidThresholds(format!(
                "info_score {info} must not exceed review_score {review}"
            )));
        }
        Ok(Self { info, review, block })
    }

    pub fn info(&self) -> f64 {
        self.info
    }

    pub fn review(&self) -> f64 {
        self.review
    }

    pub fn block(&self) -> f64 {
        self.block
    }

    /// Map a top score onto its risk tier.
    pub fn risk_level(&self, score: f64) -> RiskLevel {
        if score >= self.block {
            RiskLevel::Critical
        } else if score >= (self.review + self.block) / 2.0 {
            RiskLevel::High
        } else if score >= self.review {
            RiskLevel::Medium
        } else if score >= self.info {
            RiskLevel::Low
        } else {
            RiskLevel::None
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            info: Self::DEFAULT_INFO,
            review: Self::DEFAULT_REVIEW,
            block: Self::DEFAULT_BLOCK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decisions_are_ordered_by_severity() {
        assert!(ScreeningDecision::Clear < ScreeningDecision::Review);
        assert!(ScreeningDecision::Review < ScreeningDecision::Block);
        assert!(RiskLevel::None < RiskLevel::Low);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn decision_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ScreeningDecision::Block).unwrap(), "\"block\"");
        assert_eq!(serde_json::to_string(&RiskLevel::Critical).unwrap(), "\"critical\"");
        let d: ScreeningDecision = serde_json::from_str("\"review\"").unwrap();
        assert_eq!(d, ScreeningDecision::Review);
    }

    #[test]
    fn defaults_are_valid() {
        let t = Thresholds::default();
        assert!(Thresholds::new(t.info(), t.review(), t.block()).is_ok());
        assert_eq!(t.block(), 0.90);
    }

    #[test]
    fn thresholds_reject_inverted_order() {
        assert!(Thresholds::new(0.5, 0.9, 0.9).is_err());
        assert!(Thresholds::new(0.5, 0.95, 0.9).is_err());
        assert!(Thresholds::new(0.8, 0.75, 0.9).is_err());
    }

    #[test]
    fn thresholds_reject_out_of_range() {
        assert!(Thresholds::new(-0.1, 0.5, 0.9).is_err());
        assert!(Thresholds::new(0.1, 0.5, 1.1).is_err());
        assert!(Thresholds::new(0.1, f64::NAN, 0.9).is_err());
    }

    #[test]
    fn thresholds_allow_block_at_one() {
        assert!(Thresholds::new(0.0, 0.0, 1.0).is_ok());
    }

    #[test]
    fn risk_levels_follow_bands() {
        let t = Thresholds::new(0.5, 0.7, 0.9).unwrap();
        assert_eq!(t.risk_level(0.0), RiskLevel::None);
        assert_eq!(t.risk_level(0.49), RiskLevel::None);
        assert_eq!(t.risk_level(0.5), RiskLevel::Low);
        assert_eq!(t.risk_level(0.7), RiskLevel::Medium);
        assert_eq!(t.risk_level(0.75), RiskLevel::Medium);
        assert_eq!(t.risk_level(0.85), RiskLevel::High);
        assert_eq!(t.risk_level(0.9), RiskLevel::Critical);
        assert_eq!(t.risk_level(1.0), RiskLevel::Critical);
    }

    #[test]
    fn thresholds_deserialize_validates() {
        let ok: Thresholds =
            serde_json::from_str(r#"{"info":0.5,"review":0.75,"block":0.9}"#).unwrap();
        assert_eq!(ok.review(), 0.75);
        assert!(serde_json::from_str::<Thresholds>(r#"{"info":0.5,"review":0.95,"block":0.9}"#)
            .is_err());
    }
}
