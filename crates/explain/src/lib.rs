//! Explanation generation for trademark risk assessments.
//!
//! Derives the short conflict rationale from a factor breakdown and maps
//! risk tiers to fixed recommendation lists. Distinct from any AI-generated
//! narrative, which is an external collaborator.

use clearmark_model::{CandidateTrademark, RiskFactors, RiskLevel, TrademarkStatus};

/// Build the human-readable conflict rationale for one candidate.
///
/// Clauses are emitted in a fixed order (similarity, status, class overlap)
/// and joined with "; ". When nothing triggers, a generic fallback clause is
/// returned instead of an empty string.
pub fn conflict_reason(candidate: &CandidateTrademark, factors: &RiskFactors) -> String {
    let mut reasons: Vec<String> = Vec::new();

    if factors.similarity_score >= 80.0 {
        reasons.push(format!("Very similar to '{}'", candidate.mark_text));
    } else if factors.similarity_score >= 60.0 {
        reasons.push(format!("Similar to '{}'", candidate.mark_text));
    }

    match candidate.status {
        TrademarkStatus::Registered => reasons.push("Active registered trademark".to_string()),
        TrademarkStatus::Pending => reasons.push("Pending application".to_string()),
        _ => {}
    }

    if factors.class_overlap_score >= 80.0 {
        reasons.push(format!(
            "Same product/service class ({})",
            candidate.international_classes.join(", ")
        ));
    }

    if reasons.is_empty() {
        reasons.push("Potential similarity detected".to_string());
    }

    reasons.join("; ")
}

/// Fixed recommendation list for a risk tier.
///
/// The critical tier interpolates the conflicting owner's name so the user
/// knows whose portfolio to review.
pub fn recommendations(level: RiskLevel, owner_name: &str) -> Vec<String> {
    match level {
        RiskLevel::Critical => vec![
            "Do not proceed without legal consultation".to_string(),
            "Consider alternative brand names".to_string(),
            format!("Review {owner_name}'s trademark portfolio"),
        ],
        RiskLevel::High => vec![
            "Consult trademark attorney before proceeding".to_string(),
            "Conduct comprehensive clearance search".to_string(),
            "Evaluate name modifications or alternatives".to_string(),
        ],
        RiskLevel::Medium => vec![
            "Monitor this trademark's status".to_string(),
            "Consider filing in different international classes".to_string(),
            "Document your independent creation and use".to_string(),
        ],
        RiskLevel::Low => vec![
            "Note this mark for awareness".to_string(),
            "Proceed with standard clearance process".to_string(),
        ],
    }
}
