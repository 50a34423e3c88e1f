use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier wrapper for trainsets (e.g. `TS-01`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrainsetId(pub String);

impl TrainsetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrainsetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Induction outcome for one trainset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Revenue,
    Standby,
    Ibl,
}

impl Decision {
    pub const fn ordered() -> [Self; 3] {
        [Self::Revenue, Self::Standby, Self::Ibl]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Revenue => "REVENUE",
            Self::Standby => "STANDBY",
            Self::Ibl => "IBL",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Revenue => "Revenue Service",
            Self::Standby => "Standby",
            Self::Ibl => "Inspection Bay Line",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|decision| raw.trim().eq_ignore_ascii_case(decision.code()))
    }
}

/// Advertiser contract tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BrandingPriority {
    High,
    Medium,
    Low,
}

impl BrandingPriority {
    pub const fn ordered() -> [Self; 3] {
        [Self::High, Self::Medium, Self::Low]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|tier| raw.trim().eq_ignore_ascii_case(tier.code()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CleaningStatus {
    Completed,
    Pending,
    Overdue,
}

impl CleaningStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Completed, Self::Pending, Self::Overdue]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Completed => "COMPLETED",
            Self::Pending => "PENDING",
            Self::Overdue => "OVERDUE",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|status| raw.trim().eq_ignore_ascii_case(status.code()))
    }
}

/// Certification state of a single fitness subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FitnessStatus {
    Pass,
    Warn,
    Fail,
}

impl FitnessStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Pass, Self::Warn, Self::Fail]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|status| raw.trim().eq_ignore_ascii_case(status.code()))
    }
}

/// The three independently certified subsystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Subsystem {
    RollingStock,
    Signalling,
    Telecom,
}

impl Subsystem {
    pub const fn ordered() -> [Self; 3] {
        [Self::RollingStock, Self::Signalling, Self::Telecom]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::RollingStock => "Rolling Stock",
            Self::Signalling => "Signalling",
            Self::Telecom => "Telecom",
        }
    }

    /// Prefix used in explanation codes (`ROLLING_STOCK_FAIL`).
    pub const fn code(self) -> &'static str {
        match self {
            Self::RollingStock => "ROLLING_STOCK",
            Self::Signalling => "SIGNALLING",
            Self::Telecom => "TELECOM",
        }
    }

    pub(crate) const fn field(self) -> &'static str {
        match self {
            Self::RollingStock => "rollingStock",
            Self::Signalling => "signalling",
            Self::Telecom => "telecom",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitnessCheck {
    pub status: FitnessStatus,
    #[serde(default)]
    pub details: String,
}

impl FitnessCheck {
    pub fn new(status: FitnessStatus) -> Self {
        Self {
            status,
            details: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessCertificates {
    pub rolling_stock: FitnessCheck,
    pub signalling: FitnessCheck,
    pub telecom: FitnessCheck,
}

impl FitnessCertificates {
    pub fn uniform(status: FitnessStatus) -> Self {
        Self {
            rolling_stock: FitnessCheck::new(status),
            signalling: FitnessCheck::new(status),
            telecom: FitnessCheck::new(status),
        }
    }

    pub fn check(&self, subsystem: Subsystem) -> &FitnessCheck {
        match subsystem {
            Subsystem::RollingStock => &self.rolling_stock,
            Subsystem::Signalling => &self.signalling,
            Subsystem::Telecom => &self.telecom,
        }
    }

    pub(crate) fn check_mut(&mut self, subsystem: Subsystem) -> &mut FitnessCheck {
        match subsystem {
            Subsystem::RollingStock => &mut self.rolling_stock,
            Subsystem::Signalling => &mut self.signalling,
            Subsystem::Telecom => &mut self.telecom,
        }
    }

    /// Subsystems in canonical order paired with their status.
    pub fn statuses(&self) -> [(Subsystem, FitnessStatus); 3] {
        Subsystem::ordered().map(|subsystem| (subsystem, self.check(subsystem).status))
    }

    pub fn any(&self, status: FitnessStatus) -> bool {
        self.statuses().iter().any(|(_, current)| *current == status)
    }
}

/// Read-only view of one trainset as persisted by the storage layer.
///
/// Deserialization goes through [`TrainsetRecord`] so malformed input fails
/// with the offending field named instead of a generic serde error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TrainsetRecord")]
pub struct TrainsetSnapshot {
    pub id: TrainsetId,
    pub recommendation: Decision,
    pub reason: String,
    pub mileage_km: u64,
    pub branding_priority: BrandingPriority,
    pub job_card_open: bool,
    pub cleaning_status: CleaningStatus,
    pub fitness: FitnessCertificates,
    pub manual_override: bool,
}

impl TrainsetSnapshot {
    /// Copy of this snapshot carrying a candidate decision instead of the persisted one.
    pub fn with_decision(&self, decision: Decision, reason: impl Into<String>) -> Self {
        Self {
            recommendation: decision,
            reason: reason.into(),
            ..self.clone()
        }
    }
}

/// What-if toggles applied on top of the baseline induction policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleOverrides {
    pub force_high_branding: bool,
    pub ignore_job_cards: bool,
    pub ignore_cleaning: bool,
    pub prioritize_low_mileage: bool,
}

impl RuleOverrides {
    /// All sixteen toggle combinations, baseline first.
    pub fn combinations() -> Vec<Self> {
        (0u8..16)
            .map(|bits| Self {
                force_high_branding: bits & 0b0001 != 0,
                ignore_job_cards: bits & 0b0010 != 0,
                ignore_cleaning: bits & 0b0100 != 0,
                prioritize_low_mileage: bits & 0b1000 != 0,
            })
            .collect()
    }

    pub fn is_baseline(&self) -> bool {
        *self == Self::default()
    }
}

/// Validation failure raised while building a snapshot from external input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("missing required field `{field}`")]
    MissingField { field: String },
    #[error("invalid value {value:?} for field `{field}`")]
    InvalidField { field: String, value: String },
}

impl SnapshotError {
    pub fn field(&self) -> &str {
        match self {
            SnapshotError::MissingField { field } | SnapshotError::InvalidField { field, .. } => {
                field
            }
        }
    }

    fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    fn invalid(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Loosely typed wire shape accepted from storage and HTTP payloads.
///
/// Every field stays a raw JSON value so that type mismatches surface as
/// `SnapshotError`s naming the field rather than as serde errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainsetRecord {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub recommendation: Option<Value>,
    #[serde(default)]
    pub reason: Option<Value>,
    #[serde(default)]
    pub mileage_km: Option<Value>,
    #[serde(default)]
    pub branding_priority: Option<Value>,
    #[serde(default)]
    pub job_card_open: Option<Value>,
    #[serde(default)]
    pub cleaning_status: Option<Value>,
    #[serde(default)]
    pub fitness: Option<Value>,
    #[serde(default)]
    pub manual_override: Option<Value>,
}

impl TryFrom<TrainsetRecord> for TrainsetSnapshot {
    type Error = SnapshotError;

    fn try_from(record: TrainsetRecord) -> Result<Self, Self::Error> {
        let id = text_field("id", record.id.as_ref())?
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| SnapshotError::missing("id"))?;

        let recommendation = parse_enum(
            "recommendation",
            record.recommendation.as_ref(),
            Decision::parse,
        )?;
        let reason = text_field("reason", record.reason.as_ref())?.unwrap_or_default();
        let mileage_km = parse_mileage(record.mileage_km.as_ref())?;
        let branding_priority = parse_enum(
            "brandingPriority",
            record.branding_priority.as_ref(),
            BrandingPriority::parse,
        )?;
        let job_card_open = flag_field("jobCardOpen", record.job_card_open.as_ref())?
            .ok_or_else(|| SnapshotError::missing("jobCardOpen"))?;
        let cleaning_status = parse_enum(
            "cleaningStatus",
            record.cleaning_status.as_ref(),
            CleaningStatus::parse,
        )?;
        let fitness = parse_fitness(record.fitness.as_ref())?;
        let manual_override =
            flag_field("manualOverride", record.manual_override.as_ref())?.unwrap_or(false);

        Ok(Self {
            id: TrainsetId(id),
            recommendation,
            reason,
            mileage_km,
            branding_priority,
            job_card_open,
            cleaning_status,
            fitness,
            manual_override,
        })
    }
}

/// `None` and `null` read as absent; anything but a string is invalid.
fn text_field(field: &str, raw: Option<&Value>) -> Result<Option<String>, SnapshotError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(SnapshotError::invalid(field, other.to_string())),
    }
}

fn flag_field(field: &str, raw: Option<&Value>) -> Result<Option<bool>, SnapshotError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(other) => Err(SnapshotError::invalid(field, other.to_string())),
    }
}

fn parse_enum<T>(
    field: &str,
    raw: Option<&Value>,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, SnapshotError> {
    let raw = text_field(field, raw)?.ok_or_else(|| SnapshotError::missing(field))?;
    parse(&raw).ok_or_else(|| SnapshotError::invalid(field, raw))
}

fn parse_fitness(raw: Option<&Value>) -> Result<FitnessCertificates, SnapshotError> {
    let checks = match raw {
        None | Some(Value::Null) => return Err(SnapshotError::missing("fitness")),
        Some(Value::Object(checks)) => checks,
        Some(other) => return Err(SnapshotError::invalid("fitness", other.to_string())),
    };

    let mut fitness = FitnessCertificates::uniform(FitnessStatus::Pass);
    for subsystem in Subsystem::ordered() {
        let prefix = format!("fitness.{}", subsystem.field());
        let check = match checks.get(subsystem.field()) {
            None | Some(Value::Null) => return Err(SnapshotError::missing(prefix)),
            Some(Value::Object(check)) => check,
            Some(other) => return Err(SnapshotError::invalid(prefix, other.to_string())),
        };

        let status = parse_enum(
            &format!("{prefix}.status"),
            check.get("status"),
            FitnessStatus::parse,
        )?;
        let details =
            text_field(&format!("{prefix}.details"), check.get("details"))?.unwrap_or_default();
        *fitness.check_mut(subsystem) = FitnessCheck { status, details };
    }

    Ok(fitness)
}

fn parse_mileage(raw: Option<&Value>) -> Result<u64, SnapshotError> {
    let value = raw.ok_or_else(|| SnapshotError::missing("mileageKm"))?;
    match value {
        Value::Null => Err(SnapshotError::missing("mileageKm")),
        Value::Number(number) => number
            .as_u64()
            .ok_or_else(|| SnapshotError::invalid("mileageKm", number.to_string())),
        Value::String(text) => text
            .trim()
            .parse::<u64>()
            .map_err(|_| SnapshotError::invalid("mileageKm", text.clone())),
        other => Err(SnapshotError::invalid("mileageKm", other.to_string())),
    }
}
