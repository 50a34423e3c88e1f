//! Induction decision engine: rule-derived decisions, diagnostics, weighted
//! scoring, ranking, and what-if simulation for a trainset fleet.
//!
//! Everything below `repository`/`service`/`router` is a pure function of
//! its inputs, so the same snapshot yields the same conflicts, explanation,
//! and score whether it is reached through the live listing, the ranked
//! listing, or a simulation.

pub mod decision;
pub mod diagnostics;
pub mod domain;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod simulation;

#[cfg(test)]
mod tests;

pub use decision::{decide, RuleOutcome};
pub use diagnostics::{
    detect, explain, Conflict, ConflictKind, ConflictSeverity, DecisionExplanation,
    DiagnosedTrainset, ExplanationItem,
};
pub use domain::{
    BrandingPriority, CleaningStatus, Decision, FitnessCertificates, FitnessCheck, FitnessStatus,
    RuleOverrides, SnapshotError, Subsystem, TrainsetId, TrainsetRecord, TrainsetSnapshot,
};
pub use ranking::{rank, FilterValue, PageRequest, RankFilters, RankedPage};
pub use repository::{DecisionUpdate, FleetRepository, RepositoryError, WeightsRepository};
pub use router::induction_router;
pub use scoring::{
    score, score_breakdown, ScoreBreakdown, ScoredTrainset, ScoringWeights, WeightOverrideReport,
};
pub use service::{
    InductionService, InductionServiceError, PagingPolicy, RankQuery, RankedResponse, Suggestion,
};
pub use simulation::{simulate, DecisionChange, DecisionSummary, SimulationReport};
