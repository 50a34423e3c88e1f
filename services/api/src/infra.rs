use fleet_induction::config::InductionConfig;
use fleet_induction::error::AppError;
use fleet_induction::workflows::induction::{
    DecisionUpdate, FleetRepository, PagingPolicy, RepositoryError, ScoringWeights, TrainsetId,
    TrainsetSnapshot, WeightsRepository,
};
use fleet_induction::workflows::roster::RosterImporter;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Fleet store kept in roster order so ranking ties stay stable.
#[derive(Default, Clone)]
pub(crate) struct InMemoryFleetRepository {
    trainsets: Arc<Mutex<Vec<TrainsetSnapshot>>>,
}

impl InMemoryFleetRepository {
    pub(crate) fn from_snapshots(snapshots: Vec<TrainsetSnapshot>) -> Result<Self, RepositoryError> {
        let mut seen = HashSet::new();
        if !snapshots.iter().all(|snapshot| seen.insert(snapshot.id.clone())) {
            return Err(RepositoryError::Conflict);
        }

        Ok(Self {
            trainsets: Arc::new(Mutex::new(snapshots)),
        })
    }
}

impl FleetRepository for InMemoryFleetRepository {
    fn all(&self) -> Result<Vec<TrainsetSnapshot>, RepositoryError> {
        let guard = self.trainsets.lock().expect("repository mutex poisoned");
        Ok(guard.clone())
    }

    fn fetch(&self, id: &TrainsetId) -> Result<Option<TrainsetSnapshot>, RepositoryError> {
        let guard = self.trainsets.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|snapshot| &snapshot.id == id).cloned())
    }

    fn update_decision(
        &self,
        id: &TrainsetId,
        update: &DecisionUpdate,
    ) -> Result<TrainsetSnapshot, RepositoryError> {
        let mut guard = self.trainsets.lock().expect("repository mutex poisoned");
        let stored = guard
            .iter_mut()
            .find(|snapshot| &snapshot.id == id)
            .ok_or(RepositoryError::NotFound)?;
        *stored = update.apply(stored);
        Ok(stored.clone())
    }
}

#[derive(Clone)]
pub(crate) struct InMemoryWeightsRepository {
    weights: Arc<Mutex<ScoringWeights>>,
}

impl Default for InMemoryWeightsRepository {
    fn default() -> Self {
        Self {
            weights: Arc::new(Mutex::new(ScoringWeights::BASELINE)),
        }
    }
}

impl WeightsRepository for InMemoryWeightsRepository {
    fn load(&self) -> Result<ScoringWeights, RepositoryError> {
        Ok(*self.weights.lock().expect("weights mutex poisoned"))
    }

    fn save(&self, weights: ScoringWeights) -> Result<(), RepositoryError> {
        *self.weights.lock().expect("weights mutex poisoned") = weights;
        Ok(())
    }
}

/// Read the roster CSV when one is given, otherwise the bundled sample fleet.
pub(crate) fn load_fleet(roster: Option<&Path>) -> Result<Vec<TrainsetSnapshot>, AppError> {
    let fleet = match roster {
        Some(path) => RosterImporter::from_path(path)?,
        None => RosterImporter::sample()?,
    };
    Ok(fleet)
}

pub(crate) fn fleet_repository(
    roster: Option<&Path>,
) -> Result<InMemoryFleetRepository, AppError> {
    let fleet = load_fleet(roster)?;
    Ok(InMemoryFleetRepository::from_snapshots(fleet)?)
}

pub(crate) fn paging_policy(config: &InductionConfig) -> PagingPolicy {
    PagingPolicy {
        default_limit: config.default_page_limit,
        max_limit: config.max_page_limit,
    }
}

pub(crate) fn parse_weights(raw: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(format!("weights must be a JSON object, got '{raw}'")),
        Err(err) => Err(format!("failed to parse weights '{raw}' as JSON ({err})")),
    }
}
