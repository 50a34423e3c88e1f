use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::decision::HIGH_MILEAGE_THRESHOLD_KM;
use super::super::domain::{
    BrandingPriority, CleaningStatus, Decision, FitnessStatus, TrainsetSnapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictKind {
    MissingCertificate,
    BrandingSlaRisk,
    MileageImbalance,
    CleaningClash,
    StablingClash,
}

impl ConflictKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::MissingCertificate => "MISSING_CERTIFICATE",
            Self::BrandingSlaRisk => "BRANDING_SLA_RISK",
            Self::MileageImbalance => "MILEAGE_IMBALANCE",
            Self::CleaningClash => "CLEANING_CLASH",
            Self::StablingClash => "STABLING_CLASH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictSeverity {
    High,
    Medium,
    Low,
}

impl ConflictSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Derived diagnostic flag; recomputed on every read, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    pub severity: ConflictSeverity,
    pub message: String,
    pub detected_at: DateTime<Utc>,
}

/// Inspect one snapshot and emit its conflicts.
///
/// Output order is fixed: certificates (per subsystem), branding, mileage,
/// cleaning, stabling. `recommendation` is read as given, so callers
/// simulating a decision must pass the candidate snapshot.
pub fn detect(snapshot: &TrainsetSnapshot, detected_at: DateTime<Utc>) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    let mut push = |kind, severity, message: String| {
        conflicts.push(Conflict {
            kind,
            severity,
            message,
            detected_at,
        });
    };

    for (subsystem, status) in snapshot.fitness.statuses() {
        if status == FitnessStatus::Fail {
            push(
                ConflictKind::MissingCertificate,
                ConflictSeverity::High,
                format!("{} fitness certificate failed.", subsystem.label()),
            );
        }
    }

    if snapshot.branding_priority == BrandingPriority::High
        && snapshot.recommendation != Decision::Revenue
    {
        push(
            ConflictKind::BrandingSlaRisk,
            ConflictSeverity::Medium,
            format!(
                "High branding priority trainset held at {}; advertiser exposure SLA at risk.",
                snapshot.recommendation.code()
            ),
        );
    }

    if snapshot.mileage_km > HIGH_MILEAGE_THRESHOLD_KM {
        push(
            ConflictKind::MileageImbalance,
            ConflictSeverity::Medium,
            format!(
                "Mileage {} km exceeds balancing threshold of {} km.",
                snapshot.mileage_km, HIGH_MILEAGE_THRESHOLD_KM
            ),
        );
    }

    if snapshot.cleaning_status == CleaningStatus::Overdue
        && snapshot.recommendation == Decision::Revenue
    {
        push(
            ConflictKind::CleaningClash,
            ConflictSeverity::Low,
            "Cleaning overdue while scheduled for revenue service.".to_string(),
        );
    }

    // Placeholder: no bay geometry is modelled, a manual override is only a prompt to verify.
    if snapshot.manual_override {
        push(
            ConflictKind::StablingClash,
            ConflictSeverity::Low,
            "Manual override in effect; verify stabling position manually.".to_string(),
        );
    }

    conflicts
}
