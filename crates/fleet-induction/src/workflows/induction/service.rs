use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::diagnostics::DiagnosedTrainset;
use super::domain::{Decision, RuleOverrides, TrainsetId, TrainsetSnapshot};
use super::ranking::{rank, PageRequest, RankFilters};
use super::repository::{DecisionUpdate, FleetRepository, RepositoryError, WeightsRepository};
use super::scoring::{IgnoredWeight, ScoredTrainset, ScoringWeights, WeightOverrideReport};
use super::simulation::{simulate, SimulationReport};

/// Page size bounds applied to ranked listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingPolicy {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl PagingPolicy {
    fn resolve(&self, limit: Option<usize>) -> usize {
        limit.unwrap_or(self.default_limit).min(self.max_limit)
    }
}

impl Default for PagingPolicy {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 200,
        }
    }
}

/// Parameters for a ranked listing request.
#[derive(Debug, Clone, Default)]
pub struct RankQuery {
    pub weights: Option<Map<String, Value>>,
    pub filters: RankFilters,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedResponse {
    pub ranked: Vec<ScoredTrainset>,
    pub skip: usize,
    pub limit: usize,
    pub total: usize,
    pub weights: ScoringWeights,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored_weights: Vec<IgnoredWeight>,
}

/// Rule-derived decision that differs from the one on record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub id: TrainsetId,
    pub current: Decision,
    pub suggested: Decision,
    pub reason: String,
    pub score: i64,
}

/// Service composing the fleet store, persisted weights, and the induction engine.
pub struct InductionService<F, W> {
    fleet: Arc<F>,
    weights: Arc<W>,
    paging: PagingPolicy,
    clock: fn() -> DateTime<Utc>,
}

impl<F, W> InductionService<F, W>
where
    F: FleetRepository + 'static,
    W: WeightsRepository + 'static,
{
    pub fn new(fleet: Arc<F>, weights: Arc<W>, paging: PagingPolicy) -> Self {
        Self {
            fleet,
            weights,
            paging,
            clock: Utc::now,
        }
    }

    /// Pin the evaluation instant stamped on conflicts.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn paging(&self) -> PagingPolicy {
        self.paging
    }

    /// Every stored trainset with conflicts and explanation for its persisted decision.
    pub fn list_with_diagnostics(&self) -> Result<Vec<DiagnosedTrainset>, InductionServiceError> {
        let evaluated_at = (self.clock)();
        let diagnosed = self
            .fleet
            .all()?
            .into_iter()
            .map(|snapshot| live_diagnosis(snapshot, evaluated_at))
            .collect::<Vec<_>>();
        debug!(count = diagnosed.len(), "listed fleet with diagnostics");
        Ok(diagnosed)
    }

    pub fn get(&self, id: &TrainsetId) -> Result<DiagnosedTrainset, InductionServiceError> {
        let snapshot = self.fleet.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(live_diagnosis(snapshot, (self.clock)()))
    }

    /// Score, rank, filter, and paginate the live fleet.
    pub fn ranked(&self, query: RankQuery) -> Result<RankedResponse, InductionServiceError> {
        let (weights, report) = self.effective_weights(query.weights.as_ref())?;
        let skip = query.skip.unwrap_or(0);
        let limit = self.paging.resolve(query.limit);

        let diagnosed = self.list_with_diagnostics()?;
        let ranked = rank(
            diagnosed,
            &weights,
            &query.filters,
            PageRequest::new(skip, limit),
        );

        debug!(
            total = ranked.total,
            skip,
            limit,
            "ranked fleet for induction"
        );

        Ok(RankedResponse {
            ranked: ranked.page,
            skip,
            limit,
            total: ranked.total,
            weights,
            ignored_weights: report.ignored,
        })
    }

    /// Record an operator decision and return the recomputed diagnostics.
    pub fn update_decision(
        &self,
        id: &TrainsetId,
        update: DecisionUpdate,
    ) -> Result<DiagnosedTrainset, InductionServiceError> {
        let stored = self.fleet.update_decision(id, &update)?;
        info!(
            trainset_id = %id,
            decision = stored.recommendation.code(),
            manual_override = stored.manual_override,
            "induction decision updated"
        );
        Ok(live_diagnosis(stored, (self.clock)()))
    }

    /// What-if run over the whole fleet; nothing is persisted.
    pub fn simulate(
        &self,
        overrides: RuleOverrides,
        weights: Option<&Map<String, Value>>,
    ) -> Result<SimulationReport, InductionServiceError> {
        let (weights, _) = self.effective_weights(weights)?;
        let fleet = self.fleet.all()?;
        let report = simulate(&fleet, &overrides, &weights, (self.clock)());

        info!(
            ?overrides,
            revenue = report.summary.revenue,
            standby = report.summary.standby,
            ibl = report.summary.ibl,
            changed = report.changes.len(),
            "what-if simulation complete"
        );
        Ok(report)
    }

    /// Trainsets whose baseline rule decision differs from the persisted one, in rank order.
    pub fn suggestions(&self) -> Result<Vec<Suggestion>, InductionServiceError> {
        let report = self.simulate(RuleOverrides::default(), None)?;
        let current: HashMap<&TrainsetId, Decision> = report
            .changes
            .iter()
            .map(|change| (&change.id, change.from))
            .collect();

        Ok(report
            .ranked
            .iter()
            .filter_map(|scored| {
                current.get(&scored.snapshot.id).map(|from| Suggestion {
                    id: scored.snapshot.id.clone(),
                    current: *from,
                    suggested: scored.snapshot.recommendation,
                    reason: scored.snapshot.reason.clone(),
                    score: scored.score,
                })
            })
            .collect())
    }

    pub fn weights(&self) -> Result<ScoringWeights, InductionServiceError> {
        Ok(self.weights.load()?)
    }

    /// Merge a partial table into the persisted weights.
    pub fn update_weights(
        &self,
        overrides: &Map<String, Value>,
    ) -> Result<(ScoringWeights, WeightOverrideReport), InductionServiceError> {
        let (weights, report) = self.effective_weights(Some(overrides))?;
        self.weights.save(weights)?;
        info!(applied = ?report.applied, "persisted scoring weights updated");
        Ok((weights, report))
    }

    /// Restore the baseline weight table.
    pub fn reset_weights(&self) -> Result<ScoringWeights, InductionServiceError> {
        self.weights.save(ScoringWeights::BASELINE)?;
        info!("persisted scoring weights reset to baseline");
        Ok(ScoringWeights::BASELINE)
    }

    fn effective_weights(
        &self,
        overrides: Option<&Map<String, Value>>,
    ) -> Result<(ScoringWeights, WeightOverrideReport), InductionServiceError> {
        let persisted = self.weights.load()?;
        let Some(overrides) = overrides else {
            return Ok((persisted, WeightOverrideReport::default()));
        };

        let (weights, report) = persisted.with_overrides(overrides);
        for ignored in &report.ignored {
            warn!(
                key = %ignored.key,
                reason = ignored.reason.label(),
                "ignoring scoring weight override"
            );
        }
        Ok((weights, report))
    }
}

fn live_diagnosis(snapshot: TrainsetSnapshot, evaluated_at: DateTime<Utc>) -> DiagnosedTrainset {
    DiagnosedTrainset::from_snapshot(snapshot, &RuleOverrides::default(), evaluated_at)
}

/// Error raised by the induction service.
#[derive(Debug, thiserror::Error)]
pub enum InductionServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
