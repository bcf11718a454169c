//! Risk scoring for trademark conflict analysis.
//!
//! Combines four factor estimators (textual similarity, class overlap,
//! status strength, use in commerce) into a weighted risk score per
//! candidate, applies the famous-mark override, and classifies the result
//! into a risk tier. Also provides batch tiering with an overall-risk
//! rollup across a scored result set.

use std::collections::{BTreeSet, HashSet};

use clearmark_model::{
    CandidateTrademark, RiskAssessment, RiskFactors, RiskLevel, TierCounts, TierPartition,
    TrademarkStatus,
};
use clearmark_similarity::{default_strategy, normalize_mark, SimilarityStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from scoring operations.
///
/// Missing or empty class lists are scoring branches, not errors; the only
/// malformed-candidate case is a blank mark text.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("candidate {serial_number} has empty mark text")]
    EmptyMarkText { serial_number: String },

    #[error("scoring weights must sum to 1.0, got {sum}")]
    InvalidWeights { sum: f64 },
}

/// Weights for the four risk factors. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub similarity: f64,
    pub class_overlap: f64,
    pub status_strength: f64,
    pub use_commerce: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            similarity: 0.40,
            class_overlap: 0.30,
            status_strength: 0.20,
            use_commerce: 0.10,
        }
    }
}

impl ScoringWeights {
    pub fn validate(&self) -> Result<(), ScoreError> {
        let sum = self.similarity + self.class_overlap + self.status_strength + self.use_commerce;
        if (sum - 1.0).abs() > 1e-9 {
            return Err(ScoreError::InvalidWeights { sum });
        }
        Ok(())
    }
}

/// Reference set of well-known marks, normalized (uppercased, trimmed).
///
/// Read-only after construction; inject an alternate set for testing.
#[derive(Debug, Clone, Default)]
pub struct FamousMarks(HashSet<String>);

impl FamousMarks {
    /// Build from any iterable of names, normalizing each.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(names.into_iter().map(|n| normalize_mark(n.as_ref())).collect())
    }

    pub fn contains(&self, mark_text: &str) -> bool {
        self.0.contains(&normalize_mark(mark_text))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The built-in reference list of famous marks.
    pub fn builtin() -> Self {
        Self::from_names([
            // Tech
            "APPLE",
            "THINK DIFFERENT",
            "GOOGLE",
            "MICROSOFT",
            "AMAZON",
            "FACEBOOK",
            "META",
            "INSTAGRAM",
            "YOUTUBE",
            "TWITTER",
            "X",
            "TESLA",
            "NETFLIX",
            "UBER",
            "AIRBNB",
            // Sports/Apparel
            "NIKE",
            "JUST DO IT",
            "ADIDAS",
            "PUMA",
            "UNDER ARMOUR",
            "REEBOK",
            // Food/Beverage
            "COCA-COLA",
            "COKE",
            "PEPSI",
            "MCDONALD'S",
            "I'M LOVIN' IT",
            "STARBUCKS",
            "BURGER KING",
            "KFC",
            "SUBWAY",
            "WENDY'S",
            "RED BULL",
            // Automotive
            "FORD",
            "TOYOTA",
            "HONDA",
            "BMW",
            "MERCEDES",
            "MERCEDES-BENZ",
            "FERRARI",
            "PORSCHE",
            "CHEVROLET",
            "DODGE",
            // Luxury/Fashion
            "GUCCI",
            "LOUIS VUITTON",
            "CHANEL",
            "PRADA",
            "ROLEX",
            "CARTIER",
            // Retail/General
            "WALMART",
            "TARGET",
            "COSTCO",
            "HOME DEPOT",
            "IKEA",
            "VISA",
            "MASTERCARD",
            "AMERICAN EXPRESS",
            "PAYPAL",
        ])
    }
}

/// Normalize a Nice class code: trimmed, zero-padded to 3 digits.
fn normalize_class(code: &str) -> String {
    format!("{:0>3}", code.trim())
}

fn normalize_classes(codes: &[String]) -> BTreeSet<String> {
    codes.iter().map(|c| normalize_class(c)).collect()
}

/// Likelihood of goods/services class conflict, 0-100.
///
/// Deliberately conservative under missing information: absence of class
/// data is never read as absence of risk. Precedence:
/// 1. Candidate has no classes on record: infer from similarity.
/// 2. Query specifies classes: score the actual set intersection, falling
///    back to similarity for cross-class matches.
/// 3. Query specifies no classes: infer from similarity alone.
pub fn class_overlap_score(
    query_classes: &[String],
    mark_classes: &[String],
    similarity: f64,
) -> f64 {
    if mark_classes.is_empty() {
        return if similarity >= 95.0 {
            85.0
        } else if similarity >= 80.0 {
            70.0
        } else if similarity >= 60.0 {
            55.0
        } else {
            30.0
        };
    }

    if !query_classes.is_empty() {
        let query = normalize_classes(query_classes);
        let mark = normalize_classes(mark_classes);
        let overlap = query.intersection(&mark).count();

        if overlap > 0 {
            let ratio = overlap as f64 / query.len() as f64;
            return (80.0 + ratio * 20.0).min(100.0);
        }

        // Exact or near match in a different class still carries some risk
        return if similarity >= 95.0 {
            40.0
        } else if similarity >= 80.0 {
            25.0
        } else {
            10.0
        };
    }

    if similarity >= 95.0 {
        90.0
    } else if similarity >= 80.0 {
        75.0
    } else if similarity >= 60.0 {
        60.0
    } else {
        40.0
    }
}

/// Legal-status strength, 0-100. Registered marks score highest.
pub fn status_strength_score(status: TrademarkStatus) -> f64 {
    match status {
        TrademarkStatus::Registered => 100.0,
        TrademarkStatus::Pending => 70.0,
        TrademarkStatus::Unknown => 50.0,
        TrademarkStatus::Expired => 30.0,
        TrademarkStatus::Abandoned | TrademarkStatus::Cancelled => 20.0,
    }
}

/// Commercial-presence proxy, 0-100, keyed off status.
pub fn use_commerce_score(status: TrademarkStatus) -> f64 {
    match status {
        TrademarkStatus::Registered => 80.0,
        TrademarkStatus::Pending => 50.0,
        _ => 20.0,
    }
}

/// The risk-scoring engine.
///
/// Stateless per call and `Send + Sync`; callers may score candidates
/// concurrently. Reference data (weights, famous marks, similarity
/// strategy) is injected at construction.
pub struct RiskScorer {
    strategy: Box<dyn SimilarityStrategy>,
    weights: ScoringWeights,
    famous_marks: FamousMarks,
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskScorer {
    pub fn new() -> Self {
        Self {
            strategy: default_strategy(),
            weights: ScoringWeights::default(),
            famous_marks: FamousMarks::builtin(),
        }
    }

    pub fn with_strategy(mut self, strategy: Box<dyn SimilarityStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Replace the factor weights. Rejects sets that do not sum to 1.0.
    pub fn with_weights(mut self, weights: ScoringWeights) -> Result<Self, ScoreError> {
        weights.validate()?;
        self.weights = weights;
        Ok(self)
    }

    pub fn with_famous_marks(mut self, famous_marks: FamousMarks) -> Self {
        self.famous_marks = famous_marks;
        self
    }

    /// Compute the four factor scores for one (query, candidate) pair.
    pub fn factors(
        &self,
        query: &str,
        query_classes: &[String],
        candidate: &CandidateTrademark,
    ) -> RiskFactors {
        let similarity = self.strategy.score(query, &candidate.mark_text);
        let class_overlap =
            class_overlap_score(query_classes, &candidate.international_classes, similarity);

        RiskFactors::new(
            similarity,
            class_overlap,
            status_strength_score(candidate.status),
            use_commerce_score(candidate.status),
        )
    }

    /// Weighted aggregate with the famous-mark override, clamped to [0, 100].
    ///
    /// A famous mark with similarity >= 80 and registered status never
    /// scores below 95, regardless of the weighted-sum arithmetic.
    pub fn aggregate(
        &self,
        factors: &RiskFactors,
        mark_text: &str,
        status: TrademarkStatus,
    ) -> f64 {
        let weighted = factors.similarity_score * self.weights.similarity
            + factors.class_overlap_score * self.weights.class_overlap
            + factors.status_strength_score * self.weights.status_strength
            + factors.use_commerce_score * self.weights.use_commerce;

        let score = if self.famous_marks.contains(mark_text)
            && factors.similarity_score >= 80.0
            && status == TrademarkStatus::Registered
        {
            debug!(mark = %mark_text, "famous mark override applied");
            weighted.max(95.0)
        } else {
            weighted
        };

        score.clamp(0.0, 100.0)
    }

    /// Produce the full risk assessment for one (query, candidate) pair.
    pub fn assess(
        &self,
        query: &str,
        query_classes: &[String],
        candidate: &CandidateTrademark,
    ) -> Result<RiskAssessment, ScoreError> {
        if normalize_mark(&candidate.mark_text).is_empty() {
            return Err(ScoreError::EmptyMarkText {
                serial_number: candidate.serial_number.clone(),
            });
        }

        let factors = self.factors(query, query_classes, candidate);
        let risk_score = self.aggregate(&factors, &candidate.mark_text, candidate.status);
        let risk_level = RiskLevel::from_score(risk_score);

        debug!(
            serial = %candidate.serial_number,
            mark = %candidate.mark_text,
            similarity = factors.similarity_score,
            class_overlap = factors.class_overlap_score,
            status_strength = factors.status_strength_score,
            use_commerce = factors.use_commerce_score,
            risk_score,
            level = risk_level.as_str(),
            "scored candidate"
        );

        Ok(RiskAssessment {
            serial_number: candidate.serial_number.clone(),
            mark_text: candidate.mark_text.clone(),
            owner_name: candidate.owner_name.clone(),
            status: candidate.status,
            international_classes: candidate.international_classes.clone(),
            risk_score,
            risk_level,
            conflict_reason: clearmark_explain::conflict_reason(candidate, &factors),
            recommendations: clearmark_explain::recommendations(risk_level, &candidate.owner_name),
            risk_factors: factors,
        })
    }

    /// Score a whole candidate batch, isolating per-candidate failures.
    ///
    /// A malformed candidate is reported as skipped and never aborts the
    /// rest of the batch.
    pub fn assess_batch(
        &self,
        query: &str,
        query_classes: &[String],
        candidates: &[CandidateTrademark],
    ) -> BatchOutcome {
        let mut assessments = Vec::with_capacity(candidates.len());
        let mut skipped = Vec::new();

        for candidate in candidates {
            match self.assess(query, query_classes, candidate) {
                Ok(assessment) => assessments.push(assessment),
                Err(error) => {
                    warn!(serial = %candidate.serial_number, %error, "skipping candidate");
                    skipped.push(SkippedCandidate {
                        serial_number: candidate.serial_number.clone(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        BatchOutcome {
            assessments,
            skipped,
        }
    }
}

/// A candidate the batch scorer could not assess.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedCandidate {
    pub serial_number: String,
    pub reason: String,
}

/// Result of scoring one candidate batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// One assessment per successfully scored candidate, input order.
    pub assessments: Vec<RiskAssessment>,
    /// Candidates skipped due to per-candidate failures.
    pub skipped: Vec<SkippedCandidate>,
}

impl BatchOutcome {
    /// Group the assessments into risk tiers (stable within each tier).
    pub fn partition(&self) -> TierPartition {
        self.assessments.iter().cloned().collect()
    }
}

/// Overall-risk rollup for a scored result set.
///
/// Answers "how alarming is this result set as a whole" and uses its own
/// distribution thresholds, distinct from the per-candidate 90/70/40 bands:
/// any critical makes the set critical; two or more highs make it high; a
/// single high or three mediums make it medium.
pub fn overall_risk(counts: &TierCounts) -> RiskLevel {
    if counts.critical > 0 {
        RiskLevel::Critical
    } else if counts.high >= 2 {
        RiskLevel::High
    } else if counts.high >= 1 || counts.medium >= 3 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn make_candidate(
        serial: &str,
        mark: &str,
        status: TrademarkStatus,
        classes: &[&str],
    ) -> CandidateTrademark {
        let mut candidate = CandidateTrademark::new(serial, mark);
        candidate.status = status;
        candidate.international_classes = classes.iter().map(|c| c.to_string()).collect();
        candidate.owner_name = "Example Corp".to_string();
        candidate
    }

    fn classes(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!(ScoringWeights::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let weights = ScoringWeights {
            similarity: 0.5,
            class_overlap: 0.5,
            status_strength: 0.5,
            use_commerce: 0.0,
        };
        assert!(matches!(
            weights.validate(),
            Err(ScoreError::InvalidWeights { .. })
        ));
        assert!(RiskScorer::new().with_weights(weights).is_err());
    }

    #[test]
    fn test_famous_marks_normalized_lookup() {
        let famous = FamousMarks::builtin();
        assert!(famous.contains("NIKE"));
        assert!(famous.contains("  nike "));
        assert!(famous.contains("coca-cola"));
        assert!(!famous.contains("NIKEISH"));
    }

    #[test]
    fn test_class_normalization_pads_to_three_digits() {
        assert_eq!(normalize_class("9"), "009");
        assert_eq!(normalize_class(" 35 "), "035");
        assert_eq!(normalize_class("009"), "009");
    }

    #[test]
    fn test_overlap_missing_mark_classes_infers_from_similarity() {
        let none: Vec<String> = Vec::new();
        let query = classes(&["009"]);
        // 85 here, not 90: that band belongs to the no-query-classes branch
        assert_eq!(class_overlap_score(&query, &none, 96.0), 85.0);
        assert_eq!(class_overlap_score(&query, &none, 85.0), 70.0);
        assert_eq!(class_overlap_score(&query, &none, 65.0), 55.0);
        assert_eq!(class_overlap_score(&query, &none, 10.0), 30.0);
    }

    #[test]
    fn test_overlap_full_intersection() {
        let score = class_overlap_score(&classes(&["009"]), &classes(&["009"]), 100.0);
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_overlap_partial_intersection() {
        // Half the query classes overlap: 80 + 0.5 * 20
        let score = class_overlap_score(&classes(&["009", "035"]), &classes(&["9"]), 50.0);
        assert_eq!(score, 90.0);
    }

    #[test]
    fn test_overlap_disjoint_classes_fall_back_to_similarity() {
        let query = classes(&["025"]);
        let mark = classes(&["009"]);
        assert_eq!(class_overlap_score(&query, &mark, 96.0), 40.0);
        assert_eq!(class_overlap_score(&query, &mark, 85.0), 25.0);
        assert_eq!(class_overlap_score(&query, &mark, 30.0), 10.0);
    }

    #[test]
    fn test_overlap_no_query_classes_infers_conservatively() {
        let none: Vec<String> = Vec::new();
        let mark = classes(&["009"]);
        assert_eq!(class_overlap_score(&none, &mark, 96.0), 90.0);
        assert_eq!(class_overlap_score(&none, &mark, 85.0), 75.0);
        assert_eq!(class_overlap_score(&none, &mark, 65.0), 60.0);
        assert_eq!(class_overlap_score(&none, &mark, 30.0), 40.0);
    }

    #[test]
    fn test_status_lookups() {
        assert_eq!(status_strength_score(TrademarkStatus::Registered), 100.0);
        assert_eq!(status_strength_score(TrademarkStatus::Pending), 70.0);
        assert_eq!(status_strength_score(TrademarkStatus::Unknown), 50.0);
        assert_eq!(status_strength_score(TrademarkStatus::Expired), 30.0);
        assert_eq!(status_strength_score(TrademarkStatus::Abandoned), 20.0);
        assert_eq!(status_strength_score(TrademarkStatus::Cancelled), 20.0);

        assert_eq!(use_commerce_score(TrademarkStatus::Registered), 80.0);
        assert_eq!(use_commerce_score(TrademarkStatus::Pending), 50.0);
        assert_eq!(use_commerce_score(TrademarkStatus::Expired), 20.0);
        assert_eq!(use_commerce_score(TrademarkStatus::Unknown), 20.0);
    }

    #[test]
    fn test_exact_match_worked_example() {
        // ACME vs ACME, registered, identical class: 100*.4 + 100*.3 +
        // 100*.2 + 80*.1 = 98
        let scorer = RiskScorer::new();
        let candidate = make_candidate("001", "ACME", TrademarkStatus::Registered, &["009"]);
        let assessment = scorer.assess("ACME", &classes(&["009"]), &candidate).unwrap();

        assert_eq!(assessment.risk_factors.similarity_score, 100.0);
        assert_eq!(assessment.risk_factors.class_overlap_score, 100.0);
        assert_eq!(assessment.risk_factors.status_strength_score, 100.0);
        assert_eq!(assessment.risk_factors.use_commerce_score, 80.0);
        assert!((assessment.risk_score - 98.0).abs() < 1e-9);
        assert_eq!(assessment.risk_level, RiskLevel::Critical);
        assert!(assessment.conflict_reason.contains("Very similar to 'ACME'"));
    }

    #[test]
    fn test_aggregate_bounded() {
        let scorer = RiskScorer::new();
        for factors in [
            RiskFactors::new(0.0, 0.0, 0.0, 0.0),
            RiskFactors::new(100.0, 100.0, 100.0, 100.0),
            RiskFactors::new(13.0, 87.0, 42.0, 61.0),
        ] {
            let score = scorer.aggregate(&factors, "ZEPHYR", TrademarkStatus::Registered);
            assert!((0.0..=100.0).contains(&score));
        }
    }

    #[test]
    fn test_famous_mark_override_floors_at_95() {
        let scorer = RiskScorer::new();
        // Artificially low non-similarity factors
        let factors = RiskFactors::new(85.0, 5.0, 5.0, 5.0);

        let score = scorer.aggregate(&factors, "NIKE", TrademarkStatus::Registered);
        assert!(score >= 95.0);
        assert_eq!(RiskLevel::from_score(score), RiskLevel::Critical);
    }

    #[test]
    fn test_famous_override_requires_all_conditions() {
        let scorer = RiskScorer::new();
        let factors = RiskFactors::new(85.0, 5.0, 5.0, 5.0);

        // Not registered
        assert!(scorer.aggregate(&factors, "NIKE", TrademarkStatus::Pending) < 95.0);
        // Not famous
        assert!(scorer.aggregate(&factors, "ZEPHYR", TrademarkStatus::Registered) < 95.0);
        // Similarity below 80
        let weak = RiskFactors::new(79.9, 5.0, 5.0, 5.0);
        assert!(scorer.aggregate(&weak, "NIKE", TrademarkStatus::Registered) < 95.0);
    }

    #[test]
    fn test_aggregate_idempotent() {
        let scorer = RiskScorer::new();
        let factors = RiskFactors::new(72.0, 40.0, 100.0, 80.0);
        let first = scorer.aggregate(&factors, "ACME", TrademarkStatus::Registered);
        let second = scorer.aggregate(&factors, "ACME", TrademarkStatus::Registered);
        assert_eq!(first, second);
    }

    #[test]
    fn test_injected_famous_set() {
        let scorer =
            RiskScorer::new().with_famous_marks(FamousMarks::from_names(["ZEPHYR"]));
        let factors = RiskFactors::new(85.0, 5.0, 5.0, 5.0);
        assert!(scorer.aggregate(&factors, "zephyr", TrademarkStatus::Registered) >= 95.0);
        assert!(scorer.aggregate(&factors, "NIKE", TrademarkStatus::Registered) < 95.0);
    }

    #[test]
    fn test_unknown_status_scores_instead_of_failing() {
        let scorer = RiskScorer::new();
        let candidate = make_candidate("002", "ACME", TrademarkStatus::Unknown, &[]);
        let assessment = scorer.assess("ACME", &[], &candidate).unwrap();
        assert_eq!(assessment.risk_factors.status_strength_score, 50.0);
        assert_eq!(assessment.risk_factors.use_commerce_score, 20.0);
    }

    #[test]
    fn test_batch_isolates_malformed_candidates() {
        let scorer = RiskScorer::new();
        let candidates = vec![
            make_candidate("001", "ACME", TrademarkStatus::Registered, &["009"]),
            make_candidate("002", "   ", TrademarkStatus::Registered, &["009"]),
            make_candidate("003", "ACME CO", TrademarkStatus::Pending, &["009"]),
        ];

        let outcome = scorer.assess_batch("ACME", &classes(&["009"]), &candidates);
        assert_eq!(outcome.assessments.len(), 2);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].serial_number, "002");
        assert!(outcome.skipped[0].reason.contains("empty mark text"));
    }

    #[test]
    fn test_rollup_thresholds() {
        let counts = |critical, high, medium, low| TierCounts {
            critical,
            high,
            medium,
            low,
        };
        assert_eq!(overall_risk(&counts(1, 0, 0, 0)), RiskLevel::Critical);
        // A critical wins even when the two-high rule would also fire
        assert_eq!(overall_risk(&counts(1, 2, 0, 1)), RiskLevel::Critical);
        assert_eq!(overall_risk(&counts(0, 2, 0, 0)), RiskLevel::High);
        assert_eq!(overall_risk(&counts(0, 1, 0, 5)), RiskLevel::Medium);
        assert_eq!(overall_risk(&counts(0, 0, 3, 0)), RiskLevel::Medium);
        assert_eq!(overall_risk(&counts(0, 0, 2, 10)), RiskLevel::Low);
        assert_eq!(overall_risk(&counts(0, 0, 0, 0)), RiskLevel::Low);
    }

    #[test]
    fn test_scorer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RiskScorer>();
    }

    #[test]
    fn test_batch_partition_and_rollup() {
        let scorer = RiskScorer::new();
        let candidates = vec![
            // Exact famous match, registered: critical
            make_candidate("001", "NIKE", TrademarkStatus::Registered, &["025"]),
            // Phonetic near match, pending, same class:
            // 80*.4 + 100*.3 + 70*.2 + 50*.1 = 81, high
            make_candidate("002", "NYKE", TrademarkStatus::Pending, &["025"]),
            // Distant mark, abandoned, different class: low
            make_candidate("003", "ZZYZX TRADING", TrademarkStatus::Abandoned, &["001"]),
        ];

        let outcome = scorer.assess_batch("NIKE", &classes(&["025"]), &candidates);
        assert!(outcome.skipped.is_empty());

        let partition = outcome.partition();
        let counts = partition.counts();
        assert_eq!(counts.critical, 1);
        assert_eq!(counts.high, 1);
        assert_eq!(counts.medium, 0);
        assert_eq!(counts.low, 1);
        assert_eq!(overall_risk(&counts), RiskLevel::Critical);
    }
}
