use serde::{Deserialize, Serialize};

use super::domain::{Decision, TrainsetId, TrainsetSnapshot};
use super::scoring::ScoringWeights;

/// Operator-issued change to a trainset's persisted decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionUpdate {
    pub recommendation: Decision,
    pub manual_override: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DecisionUpdate {
    /// Produce the updated snapshot; the input is left untouched.
    ///
    /// Without an explicit reason the stored one is kept, except for manual
    /// overrides, which record who set the decision.
    pub fn apply(&self, snapshot: &TrainsetSnapshot) -> TrainsetSnapshot {
        let reason = match (&self.reason, self.manual_override) {
            (Some(reason), _) => reason.clone(),
            (None, true) => format!("Manually set to {}.", self.recommendation.code()),
            (None, false) => snapshot.reason.clone(),
        };

        TrainsetSnapshot {
            recommendation: self.recommendation,
            reason,
            manual_override: self.manual_override,
            ..snapshot.clone()
        }
    }
}

/// Storage abstraction for trainset snapshots.
///
/// `all` must return trainsets in a stable order; ranking ties fall back to it.
pub trait FleetRepository: Send + Sync {
    fn all(&self) -> Result<Vec<TrainsetSnapshot>, RepositoryError>;
    fn fetch(&self, id: &TrainsetId) -> Result<Option<TrainsetSnapshot>, RepositoryError>;
    /// Apply the update atomically and return the stored result.
    fn update_decision(
        &self,
        id: &TrainsetId,
        update: &DecisionUpdate,
    ) -> Result<TrainsetSnapshot, RepositoryError>;
}

/// Persisted default weight table used when a request carries no override.
pub trait WeightsRepository: Send + Sync {
    fn load(&self) -> Result<ScoringWeights, RepositoryError>;
    fn save(&self, weights: ScoringWeights) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
