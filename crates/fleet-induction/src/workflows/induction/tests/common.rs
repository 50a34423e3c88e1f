use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::induction::domain::{
    BrandingPriority, CleaningStatus, Decision, FitnessCertificates, FitnessCheck, FitnessStatus,
    Subsystem, TrainsetId, TrainsetSnapshot,
};
use crate::workflows::induction::repository::{
    DecisionUpdate, FleetRepository, RepositoryError, WeightsRepository,
};
use crate::workflows::induction::scoring::ScoringWeights;
use crate::workflows::induction::service::{InductionService, PagingPolicy};
use crate::workflows::induction::induction_router;

pub(super) fn evaluated_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 4, 30, 0)
        .single()
        .expect("valid timestamp")
}

/// Fully serviceable mid-mileage trainset already scheduled for revenue.
pub(super) fn trainset(id: &str) -> TrainsetSnapshot {
    TrainsetSnapshot {
        id: TrainsetId(id.to_string()),
        recommendation: Decision::Revenue,
        reason: "All systems operational.".to_string(),
        mileage_km: 30_000,
        branding_priority: BrandingPriority::Medium,
        job_card_open: false,
        cleaning_status: CleaningStatus::Completed,
        fitness: FitnessCertificates::uniform(FitnessStatus::Pass),
        manual_override: false,
    }
}

pub(super) fn with_fitness(
    mut snapshot: TrainsetSnapshot,
    subsystem: Subsystem,
    status: FitnessStatus,
) -> TrainsetSnapshot {
    let check = FitnessCheck {
        status,
        details: format!("{} {}", subsystem.label(), status.code()),
    };
    match subsystem {
        Subsystem::RollingStock => snapshot.fitness.rolling_stock = check,
        Subsystem::Signalling => snapshot.fitness.signalling = check,
        Subsystem::Telecom => snapshot.fitness.telecom = check,
    }
    snapshot
}

/// High-branding, low-mileage trainset with every check passing.
pub(super) fn flagship(id: &str) -> TrainsetSnapshot {
    TrainsetSnapshot {
        mileage_km: 12_450,
        branding_priority: BrandingPriority::High,
        ..trainset(id)
    }
}

pub(super) fn sample_fleet() -> Vec<TrainsetSnapshot> {
    let mut warned = with_fitness(trainset("TS-02"), Subsystem::Signalling, FitnessStatus::Warn);
    warned.recommendation = Decision::Standby;
    warned.reason = "System warning detected. Suitable for standby.".to_string();
    warned.branding_priority = BrandingPriority::High;

    let mut job_card = trainset("TS-03");
    job_card.job_card_open = true;
    job_card.recommendation = Decision::Ibl;
    job_card.reason = "Open job card requires attention.".to_string();
    job_card.mileage_km = 58_000;

    let mut overdue = trainset("TS-04");
    overdue.cleaning_status = CleaningStatus::Overdue;
    overdue.branding_priority = BrandingPriority::Low;

    let mut forced = with_fitness(trainset("TS-05"), Subsystem::Telecom, FitnessStatus::Fail);
    forced.manual_override = true;
    forced.reason = "Manually set to REVENUE.".to_string();

    let mut light = trainset("TS-06");
    light.mileage_km = 8_200;
    light.recommendation = Decision::Standby;
    light.reason = "Held for peak reserve.".to_string();
    light.cleaning_status = CleaningStatus::Pending;

    vec![flagship("TS-01"), warned, job_card, overdue, forced, light]
}

#[derive(Default, Clone)]
pub(super) struct MemoryFleet {
    trainsets: Arc<Mutex<Vec<TrainsetSnapshot>>>,
}

impl MemoryFleet {
    pub(super) fn with(trainsets: Vec<TrainsetSnapshot>) -> Self {
        Self {
            trainsets: Arc::new(Mutex::new(trainsets)),
        }
    }

    pub(super) fn snapshot(&self, id: &str) -> TrainsetSnapshot {
        self.trainsets
            .lock()
            .expect("fleet mutex poisoned")
            .iter()
            .find(|trainset| trainset.id.as_str() == id)
            .cloned()
            .expect("trainset present")
    }
}

impl FleetRepository for MemoryFleet {
    fn all(&self) -> Result<Vec<TrainsetSnapshot>, RepositoryError> {
        Ok(self.trainsets.lock().expect("fleet mutex poisoned").clone())
    }

    fn fetch(&self, id: &TrainsetId) -> Result<Option<TrainsetSnapshot>, RepositoryError> {
        let guard = self.trainsets.lock().expect("fleet mutex poisoned");
        Ok(guard.iter().find(|trainset| &trainset.id == id).cloned())
    }

    fn update_decision(
        &self,
        id: &TrainsetId,
        update: &DecisionUpdate,
    ) -> Result<TrainsetSnapshot, RepositoryError> {
        let mut guard = self.trainsets.lock().expect("fleet mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|trainset| &trainset.id == id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = update.apply(slot);
        Ok(slot.clone())
    }
}

pub(super) struct UnavailableFleet;

impl FleetRepository for UnavailableFleet {
    fn all(&self) -> Result<Vec<TrainsetSnapshot>, RepositoryError> {
        Err(RepositoryError::Unavailable("depot database offline".to_string()))
    }

    fn fetch(&self, _id: &TrainsetId) -> Result<Option<TrainsetSnapshot>, RepositoryError> {
        Err(RepositoryError::Unavailable("depot database offline".to_string()))
    }

    fn update_decision(
        &self,
        _id: &TrainsetId,
        _update: &DecisionUpdate,
    ) -> Result<TrainsetSnapshot, RepositoryError> {
        Err(RepositoryError::Unavailable("depot database offline".to_string()))
    }
}

#[derive(Clone)]
pub(super) struct MemoryWeights {
    weights: Arc<Mutex<ScoringWeights>>,
}

impl Default for MemoryWeights {
    fn default() -> Self {
        Self {
            weights: Arc::new(Mutex::new(ScoringWeights::BASELINE)),
        }
    }
}

impl WeightsRepository for MemoryWeights {
    fn load(&self) -> Result<ScoringWeights, RepositoryError> {
        Ok(*self.weights.lock().expect("weights mutex poisoned"))
    }

    fn save(&self, weights: ScoringWeights) -> Result<(), RepositoryError> {
        *self.weights.lock().expect("weights mutex poisoned") = weights;
        Ok(())
    }
}

pub(super) type TestService = InductionService<MemoryFleet, MemoryWeights>;

pub(super) fn build_service() -> (TestService, Arc<MemoryFleet>, Arc<MemoryWeights>) {
    let fleet = Arc::new(MemoryFleet::with(sample_fleet()));
    let weights = Arc::new(MemoryWeights::default());
    let service = InductionService::new(fleet.clone(), weights.clone(), PagingPolicy::default())
        .with_clock(evaluated_at);
    (service, fleet, weights)
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    induction_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
