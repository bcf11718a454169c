//! Core domain model for Clearmark trademark risk analysis.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `CandidateTrademark`: a normalized trademark record from the retrieval layer
//! - `TrademarkStatus`: registered/pending/abandoned/cancelled/expired status
//! - `RiskFactors` and `RiskAssessment`: the scorer's per-candidate output
//! - `TierPartition`: assessments grouped by risk level

use serde::{Deserialize, Serialize};

/// Status of a trademark registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrademarkStatus {
    /// Active registration
    Registered,
    /// Application in progress
    Pending,
    /// Abandoned application
    Abandoned,
    /// Registration cancelled
    Cancelled,
    /// Registration expired
    Expired,
    /// Unknown status
    Unknown,
}

impl Default for TrademarkStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

impl From<&str> for TrademarkStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "registered" => Self::Registered,
            "pending" => Self::Pending,
            "abandoned" => Self::Abandoned,
            "cancelled" => Self::Cancelled,
            "expired" => Self::Expired,
            _ => Self::Unknown,
        }
    }
}

impl TrademarkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Pending => "pending",
            Self::Abandoned => "abandoned",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::Unknown => "unknown",
        }
    }
}

/// A normalized candidate trademark from the retrieval layer.
///
/// This is the canonical representation consumed by the scorer.
/// Produced by the external retrieval collaborator; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateTrademark {
    /// USPTO serial number (8 digits, zero-padded)
    pub serial_number: String,

    /// Registration number (if registered)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,

    /// The mark text (word mark)
    #[serde(default)]
    pub mark_text: String,

    /// Owner/registrant name
    #[serde(default)]
    pub owner_name: String,

    /// Current status
    #[serde(default)]
    pub status: TrademarkStatus,

    /// Nice classification codes, as retrieved (normalization happens at
    /// scoring time)
    #[serde(default)]
    pub international_classes: Vec<String>,

    /// Goods and services description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goods_services_description: Option<String>,

    /// Filing date (ISO format)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filing_date: Option<String>,

    /// Registration date (ISO format)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<String>,
}

impl CandidateTrademark {
    /// Create a minimal record for testing.
    pub fn new(serial_number: impl Into<String>, mark_text: impl Into<String>) -> Self {
        Self {
            serial_number: serial_number.into(),
            registration_number: None,
            mark_text: mark_text.into(),
            owner_name: String::new(),
            status: TrademarkStatus::Unknown,
            international_classes: Vec::new(),
            goods_services_description: None,
            filing_date: None,
            registration_date: None,
        }
    }
}

/// The four factor scores that feed the weighted aggregate.
///
/// Every field is clamped to [0, 100] at construction; an aggregate can
/// only be computed from a value of this type, so all four factors are
/// always present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub similarity_score: f64,
    pub class_overlap_score: f64,
    pub status_strength_score: f64,
    pub use_commerce_score: f64,
}

impl RiskFactors {
    pub fn new(
        similarity_score: f64,
        class_overlap_score: f64,
        status_strength_score: f64,
        use_commerce_score: f64,
    ) -> Self {
        Self {
            similarity_score: similarity_score.clamp(0.0, 100.0),
            class_overlap_score: class_overlap_score.clamp(0.0, 100.0),
            status_strength_score: status_strength_score.clamp(0.0, 100.0),
            use_commerce_score: use_commerce_score.clamp(0.0, 100.0),
        }
    }
}

/// Risk tier for a single candidate or a whole result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Map a numeric risk score to its tier.
    ///
    /// Boundaries are inclusive on the lower bound: exactly 90.0 is
    /// critical, not high. Downstream consumers depend on the 90/70/40
    /// bands; do not change them silently.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Critical
        } else if score >= 70.0 {
            Self::High
        } else if score >= 40.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Risk assessment for one (query, candidate) pair.
///
/// Created once by the scorer, immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub serial_number: String,
    pub mark_text: String,
    pub owner_name: String,
    pub status: TrademarkStatus,
    pub international_classes: Vec<String>,

    /// Weighted aggregate in [0, 100]
    pub risk_score: f64,
    pub risk_level: RiskLevel,

    /// Factor breakdown
    pub risk_factors: RiskFactors,

    /// Short human-readable rationale (clause list joined with "; ")
    pub conflict_reason: String,

    /// Tier-keyed action items
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Per-tier counts for a scored result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Assessments grouped by risk level.
///
/// Purely derived from a sequence of assessments; preserves input order
/// within each bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierPartition {
    pub critical: Vec<RiskAssessment>,
    pub high: Vec<RiskAssessment>,
    pub medium: Vec<RiskAssessment>,
    pub low: Vec<RiskAssessment>,
}

impl TierPartition {
    pub fn push(&mut self, assessment: RiskAssessment) {
        match assessment.risk_level {
            RiskLevel::Critical => self.critical.push(assessment),
            RiskLevel::High => self.high.push(assessment),
            RiskLevel::Medium => self.medium.push(assessment),
            RiskLevel::Low => self.low.push(assessment),
        }
    }

    pub fn counts(&self) -> TierCounts {
        TierCounts {
            critical: self.critical.len(),
            high: self.high.len(),
            medium: self.medium.len(),
            low: self.low.len(),
        }
    }

    pub fn total(&self) -> usize {
        self.critical.len() + self.high.len() + self.medium.len() + self.low.len()
    }
}

impl FromIterator<RiskAssessment> for TierPartition {
    fn from_iter<I: IntoIterator<Item = RiskAssessment>>(iter: I) -> Self {
        let mut partition = Self::default();
        for assessment in iter {
            partition.push(assessment);
        }
        partition
    }
}
