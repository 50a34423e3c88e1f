//! Derived, non-authoritative diagnostics attached to every induction decision.

mod conflicts;
mod explanation;

pub use conflicts::{detect, Conflict, ConflictKind, ConflictSeverity};
pub use explanation::{codes, explain, DecisionExplanation, ExplanationItem};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{RuleOverrides, TrainsetSnapshot};

/// Snapshot paired with the conflicts and explanation derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosedTrainset {
    #[serde(flatten)]
    pub snapshot: TrainsetSnapshot,
    pub conflicts: Vec<Conflict>,
    pub explanation: DecisionExplanation,
}

impl DiagnosedTrainset {
    /// Diagnose the snapshot's own decision and reason, as the live listing does.
    pub fn from_snapshot(
        snapshot: TrainsetSnapshot,
        overrides: &RuleOverrides,
        evaluated_at: DateTime<Utc>,
    ) -> Self {
        let conflicts = detect(&snapshot, evaluated_at);
        let explanation = explain(
            &snapshot,
            overrides,
            snapshot.recommendation,
            &snapshot.reason,
        );

        Self {
            snapshot,
            conflicts,
            explanation,
        }
    }
}
