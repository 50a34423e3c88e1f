mod weights;

pub use weights::{
    IgnoredWeight, IgnoredWeightReason, ScoringWeights, WeightOverrideReport, MAX_WEIGHT_MAGNITUDE,
};

use serde::Serialize;

use super::decision::{HIGH_MILEAGE_THRESHOLD_KM, LOW_MILEAGE_THRESHOLD_KM};
use super::diagnostics::{Conflict, ConflictSeverity, DecisionExplanation, DiagnosedTrainset};
use super::domain::{BrandingPriority, CleaningStatus, FitnessStatus, TrainsetSnapshot};

/// Named sub-scores; they always sum to the trainset's score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub fitness: i64,
    pub mileage: i64,
    pub branding: i64,
    pub cleaning: i64,
    pub job_card: i64,
    pub penalties: i64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> i64 {
        self.fitness + self.mileage + self.branding + self.cleaning + self.job_card + self.penalties
    }
}

/// Diagnosed trainset with its weighted score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredTrainset {
    #[serde(flatten)]
    pub snapshot: TrainsetSnapshot,
    pub conflicts: Vec<Conflict>,
    pub explanation: DecisionExplanation,
    pub score: i64,
    pub breakdown: ScoreBreakdown,
}

/// Compute the weighted breakdown for one snapshot.
///
/// Conflicts and explanation are optional; when absent they add no penalty.
/// Weights are clamped to `MAX_WEIGHT_MAGNITUDE` before use.
pub fn score_breakdown(
    snapshot: &TrainsetSnapshot,
    conflicts: Option<&[Conflict]>,
    explanation: Option<&DecisionExplanation>,
    weights: &ScoringWeights,
) -> ScoreBreakdown {
    let weights = &weights.clamped();
    let fitness = snapshot
        .fitness
        .statuses()
        .iter()
        .map(|(_, status)| match status {
            FitnessStatus::Pass => weights.fitness_pass,
            FitnessStatus::Warn => weights.fitness_warn,
            FitnessStatus::Fail => weights.fitness_fail,
        })
        .sum::<i64>();

    let mileage = if snapshot.mileage_km < LOW_MILEAGE_THRESHOLD_KM {
        weights.low_mileage
    } else if snapshot.mileage_km > HIGH_MILEAGE_THRESHOLD_KM {
        weights.high_mileage
    } else {
        0
    };

    let branding = match snapshot.branding_priority {
        BrandingPriority::High => weights.branding_high,
        BrandingPriority::Medium => weights.branding_medium,
        BrandingPriority::Low => weights.branding_low,
    };

    let cleaning = match snapshot.cleaning_status {
        CleaningStatus::Completed => weights.cleaning_completed,
        CleaningStatus::Pending => weights.cleaning_pending,
        CleaningStatus::Overdue => weights.cleaning_overdue,
    };

    let job_card = if snapshot.job_card_open {
        weights.job_card_open
    } else {
        weights.job_card_clear
    };

    let conflict_penalty = conflicts
        .unwrap_or_default()
        .iter()
        .map(|conflict| match conflict.severity {
            ConflictSeverity::High => weights.conflict_high_penalty,
            ConflictSeverity::Medium => weights.conflict_medium_penalty,
            ConflictSeverity::Low => weights.conflict_low_penalty,
        })
        .sum::<i64>();

    let explanation_penalty = explanation
        .map(|explanation| {
            weights.explanation_blocker_penalty * count(explanation.blockers.len())
                + weights.explanation_warning_penalty * count(explanation.warnings.len())
        })
        .unwrap_or(0);

    let manual_penalty = if snapshot.manual_override {
        weights.manual_override_penalty
    } else {
        0
    };

    ScoreBreakdown {
        fitness,
        mileage,
        branding,
        cleaning,
        job_card,
        penalties: conflict_penalty + explanation_penalty + manual_penalty,
    }
}

pub fn score(diagnosed: DiagnosedTrainset, weights: &ScoringWeights) -> ScoredTrainset {
    let breakdown = score_breakdown(
        &diagnosed.snapshot,
        Some(diagnosed.conflicts.as_slice()),
        Some(&diagnosed.explanation),
        weights,
    );

    ScoredTrainset {
        snapshot: diagnosed.snapshot,
        conflicts: diagnosed.conflicts,
        explanation: diagnosed.explanation,
        score: breakdown.total(),
        breakdown,
    }
}

fn count(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}
