use serde::{Deserialize, Serialize};

use super::domain::{
    BrandingPriority, CleaningStatus, Decision, FitnessStatus, RuleOverrides, TrainsetSnapshot,
};

pub const REASON_CRITICAL_FAILURE: &str = "Critical system failure detected.";
pub const REASON_SYSTEM_WARNING: &str = "System warning detected. Suitable for standby.";
pub const REASON_ALL_OPERATIONAL: &str = "All systems operational.";
pub const REASON_OPEN_JOB_CARD: &str = "Open job card requires attention.";
pub const REASON_CLEANING_OVERDUE: &str = "Cleaning overdue. Hold for non-peak service.";
pub const REASON_BRANDING_PROMOTION: &str =
    "Promoted to revenue: High branding priority override.";
pub const REASON_LOW_MILEAGE_PROMOTION: &str = "Promoted to revenue: Low mileage priority.";

/// Mileage below which a trainset counts as lightly used.
pub const LOW_MILEAGE_THRESHOLD_KM: u64 = 20_000;
/// Mileage above which a trainset is flagged for balancing.
pub const HIGH_MILEAGE_THRESHOLD_KM: u64 = 50_000;

/// Decision derived by the rule engine together with the rationale that won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub decision: Decision,
    pub reason: String,
}

/// Apply the induction policy to one snapshot.
///
/// Rules run in a fixed order and each may overwrite the previous result:
/// fitness, open job card, overdue cleaning, branding promotion, low-mileage
/// promotion. The order decides which reason text survives, so it must not
/// be rearranged.
pub fn decide(snapshot: &TrainsetSnapshot, overrides: &RuleOverrides) -> RuleOutcome {
    let fitness = &snapshot.fitness;
    let has_failure = fitness.any(FitnessStatus::Fail);

    let (mut decision, mut reason) = if has_failure {
        (Decision::Ibl, REASON_CRITICAL_FAILURE)
    } else if fitness.any(FitnessStatus::Warn) {
        (Decision::Standby, REASON_SYSTEM_WARNING)
    } else {
        (Decision::Revenue, REASON_ALL_OPERATIONAL)
    };

    if snapshot.job_card_open && !overrides.ignore_job_cards {
        decision = Decision::Ibl;
        reason = REASON_OPEN_JOB_CARD;
    }

    if snapshot.cleaning_status == CleaningStatus::Overdue
        && !overrides.ignore_cleaning
        && decision == Decision::Revenue
    {
        decision = Decision::Standby;
        reason = REASON_CLEANING_OVERDUE;
    }

    let promotable = !has_failure && !snapshot.job_card_open;

    if overrides.force_high_branding
        && snapshot.branding_priority == BrandingPriority::High
        && decision == Decision::Standby
        && promotable
    {
        decision = Decision::Revenue;
        reason = REASON_BRANDING_PROMOTION;
    }

    if overrides.prioritize_low_mileage
        && snapshot.mileage_km < LOW_MILEAGE_THRESHOLD_KM
        && decision == Decision::Standby
        && promotable
    {
        decision = Decision::Revenue;
        reason = REASON_LOW_MILEAGE_PROMOTION;
    }

    RuleOutcome {
        decision,
        reason: reason.to_string(),
    }
}
