use serde::{Deserialize, Serialize};

use super::super::decision::{HIGH_MILEAGE_THRESHOLD_KM, LOW_MILEAGE_THRESHOLD_KM};
use super::super::domain::{
    BrandingPriority, CleaningStatus, Decision, FitnessStatus, RuleOverrides, TrainsetSnapshot,
};

/// Stable machine-readable explanation codes.
pub mod codes {
    pub const JOB_CARD_OPEN: &str = "JOB_CARD_OPEN";
    pub const CLEANING_OVERDUE: &str = "CLEANING_OVERDUE";
    pub const HIGH_MILEAGE: &str = "HIGH_MILEAGE";
    pub const BRANDING_HIGH: &str = "BRANDING_HIGH";
    pub const LOW_MILEAGE_PRIORITY: &str = "LOW_MILEAGE_PRIORITY";
    pub const JOB_CARD_IGNORED: &str = "JOB_CARD_IGNORED";
    pub const CLEANING_IGNORED: &str = "CLEANING_IGNORED";
    pub const MANUAL_OVERRIDE: &str = "MANUAL_OVERRIDE";
    pub const REVENUE_WITH_BLOCKERS: &str = "REVENUE_WITH_BLOCKERS";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationItem {
    pub code: String,
    pub message: String,
}

impl ExplanationItem {
    fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Labelled reasons behind a decision, in a stable order for audits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionExplanation {
    pub blockers: Vec<ExplanationItem>,
    pub warnings: Vec<ExplanationItem>,
    pub promoters: Vec<ExplanationItem>,
    pub overrides: Vec<ExplanationItem>,
    pub final_reason: String,
}

impl DecisionExplanation {
    pub fn has_code(&self, code: &str) -> bool {
        self.blockers
            .iter()
            .chain(&self.warnings)
            .chain(&self.promoters)
            .chain(&self.overrides)
            .any(|item| item.code == code)
    }
}

pub fn explain(
    snapshot: &TrainsetSnapshot,
    overrides: &RuleOverrides,
    final_decision: Decision,
    final_reason: &str,
) -> DecisionExplanation {
    let mut explanation = DecisionExplanation {
        final_reason: final_reason.to_string(),
        ..DecisionExplanation::default()
    };

    for (subsystem, status) in snapshot.fitness.statuses() {
        if status == FitnessStatus::Fail {
            explanation.blockers.push(ExplanationItem::new(
                format!("{}_FAIL", subsystem.code()),
                format!("{} fitness check failed.", subsystem.label()),
            ));
        }
    }

    if snapshot.job_card_open {
        if overrides.ignore_job_cards {
            explanation.overrides.push(ExplanationItem::new(
                codes::JOB_CARD_IGNORED,
                "Open job card ignored by rule override.",
            ));
        } else {
            explanation.blockers.push(ExplanationItem::new(
                codes::JOB_CARD_OPEN,
                "Open job card must be closed before service.",
            ));
        }
    }

    for (subsystem, status) in snapshot.fitness.statuses() {
        if status == FitnessStatus::Warn {
            explanation.warnings.push(ExplanationItem::new(
                format!("{}_WARN", subsystem.code()),
                format!("{} fitness check raised a warning.", subsystem.label()),
            ));
        }
    }

    if snapshot.cleaning_status == CleaningStatus::Overdue {
        if overrides.ignore_cleaning {
            explanation.overrides.push(ExplanationItem::new(
                codes::CLEANING_IGNORED,
                "Overdue cleaning ignored by rule override.",
            ));
        } else {
            explanation.warnings.push(ExplanationItem::new(
                codes::CLEANING_OVERDUE,
                "Cleaning is overdue.",
            ));
        }
    }

    if snapshot.mileage_km > HIGH_MILEAGE_THRESHOLD_KM {
        explanation.warnings.push(ExplanationItem::new(
            codes::HIGH_MILEAGE,
            format!(
                "Mileage {} km is above {} km.",
                snapshot.mileage_km, HIGH_MILEAGE_THRESHOLD_KM
            ),
        ));
    }

    if snapshot.branding_priority == BrandingPriority::High {
        explanation.promoters.push(ExplanationItem::new(
            codes::BRANDING_HIGH,
            "High branding priority favours revenue deployment.",
        ));
    }

    if overrides.prioritize_low_mileage && snapshot.mileage_km < LOW_MILEAGE_THRESHOLD_KM {
        explanation.promoters.push(ExplanationItem::new(
            codes::LOW_MILEAGE_PRIORITY,
            format!(
                "Mileage {} km is below {} km and low mileage is prioritised.",
                snapshot.mileage_km, LOW_MILEAGE_THRESHOLD_KM
            ),
        ));
    }

    if snapshot.manual_override {
        explanation.overrides.push(ExplanationItem::new(
            codes::MANUAL_OVERRIDE,
            "Decision was set manually by an operator.",
        ));
    }

    if final_decision == Decision::Revenue && !explanation.blockers.is_empty() {
        explanation.overrides.push(ExplanationItem::new(
            codes::REVENUE_WITH_BLOCKERS,
            format!(
                "Scheduled for revenue despite {} blocker(s); requires human review.",
                explanation.blockers.len()
            ),
        ));
    }

    explanation
}
