use chrono::{DateTime, Utc};
use serde::Serialize;

use super::decision::decide;
use super::diagnostics::{detect, explain, DiagnosedTrainset};
use super::domain::{Decision, RuleOverrides, TrainsetId, TrainsetSnapshot};
use super::ranking::score_and_sort;
use super::scoring::{ScoredTrainset, ScoringWeights};

/// Decision counts across a fleet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecisionSummary {
    pub revenue: usize,
    pub standby: usize,
    pub ibl: usize,
    pub total: usize,
}

impl DecisionSummary {
    pub fn from_decisions(decisions: impl IntoIterator<Item = Decision>) -> Self {
        let mut summary = Self::default();
        for decision in decisions {
            match decision {
                Decision::Revenue => summary.revenue += 1,
                Decision::Standby => summary.standby += 1,
                Decision::Ibl => summary.ibl += 1,
            }
            summary.total += 1;
        }
        summary
    }

    pub fn count(&self, decision: Decision) -> usize {
        match decision {
            Decision::Revenue => self.revenue,
            Decision::Standby => self.standby,
            Decision::Ibl => self.ibl,
        }
    }
}

/// A trainset whose simulated decision differs from the persisted one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionChange {
    pub id: TrainsetId,
    pub from: Decision,
    pub to: Decision,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub overrides: RuleOverrides,
    pub summary: DecisionSummary,
    pub changes: Vec<DecisionChange>,
    pub ranked: Vec<ScoredTrainset>,
}

/// Re-derive one snapshot's decision under `overrides` and diagnose the candidate.
pub fn diagnose_candidate(
    snapshot: &TrainsetSnapshot,
    overrides: &RuleOverrides,
    evaluated_at: DateTime<Utc>,
) -> DiagnosedTrainset {
    let outcome = decide(snapshot, overrides);
    let candidate = snapshot.with_decision(outcome.decision, outcome.reason);
    let conflicts = detect(&candidate, evaluated_at);
    let explanation = explain(
        &candidate,
        overrides,
        candidate.recommendation,
        &candidate.reason,
    );

    DiagnosedTrainset {
        snapshot: candidate,
        conflicts,
        explanation,
    }
}

/// Run the full decision pipeline over a fleet without persisting anything.
pub fn simulate(
    snapshots: &[TrainsetSnapshot],
    overrides: &RuleOverrides,
    weights: &ScoringWeights,
    evaluated_at: DateTime<Utc>,
) -> SimulationReport {
    let candidates: Vec<DiagnosedTrainset> = snapshots
        .iter()
        .map(|snapshot| diagnose_candidate(snapshot, overrides, evaluated_at))
        .collect();

    let changes = snapshots
        .iter()
        .zip(&candidates)
        .filter(|(original, candidate)| {
            original.recommendation != candidate.snapshot.recommendation
        })
        .map(|(original, candidate)| DecisionChange {
            id: original.id.clone(),
            from: original.recommendation,
            to: candidate.snapshot.recommendation,
        })
        .collect();

    let summary = DecisionSummary::from_decisions(
        candidates
            .iter()
            .map(|candidate| candidate.snapshot.recommendation),
    );

    SimulationReport {
        overrides: *overrides,
        summary,
        changes,
        ranked: score_and_sort(candidates, weights),
    }
}
