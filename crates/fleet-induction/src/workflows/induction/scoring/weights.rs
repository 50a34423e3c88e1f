use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Largest magnitude a single weight may take; keeps every score sum within `i64`.
pub const MAX_WEIGHT_MAGNITUDE: i64 = 1_000_000;

/// Signed weight per score contribution. Swappable per ranking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringWeights {
    pub fitness_pass: i64,
    pub fitness_warn: i64,
    pub fitness_fail: i64,
    pub low_mileage: i64,
    pub high_mileage: i64,
    pub branding_high: i64,
    pub branding_medium: i64,
    pub branding_low: i64,
    pub cleaning_completed: i64,
    pub cleaning_pending: i64,
    pub cleaning_overdue: i64,
    pub job_card_clear: i64,
    pub job_card_open: i64,
    pub conflict_high_penalty: i64,
    pub conflict_medium_penalty: i64,
    pub conflict_low_penalty: i64,
    pub explanation_blocker_penalty: i64,
    pub explanation_warning_penalty: i64,
    pub manual_override_penalty: i64,
}

impl ScoringWeights {
    /// Baseline table shipped with the engine.
    pub const BASELINE: Self = Self {
        fitness_pass: 10,
        fitness_warn: -5,
        fitness_fail: -20,
        low_mileage: 8,
        high_mileage: -6,
        branding_high: 6,
        branding_medium: 2,
        branding_low: 0,
        cleaning_completed: 4,
        cleaning_pending: 0,
        cleaning_overdue: -4,
        job_card_clear: 5,
        job_card_open: -8,
        conflict_high_penalty: -25,
        conflict_medium_penalty: -10,
        conflict_low_penalty: -3,
        explanation_blocker_penalty: -8,
        explanation_warning_penalty: -2,
        manual_override_penalty: -1,
    };

    /// Whitelisted keys, in wire (camelCase) form.
    pub const KEYS: [&'static str; 19] = [
        "fitnessPass",
        "fitnessWarn",
        "fitnessFail",
        "lowMileage",
        "highMileage",
        "brandingHigh",
        "brandingMedium",
        "brandingLow",
        "cleaningCompleted",
        "cleaningPending",
        "cleaningOverdue",
        "jobCardClear",
        "jobCardOpen",
        "conflictHighPenalty",
        "conflictMediumPenalty",
        "conflictLowPenalty",
        "explanationBlockerPenalty",
        "explanationWarningPenalty",
        "manualOverridePenalty",
    ];

    pub fn get(&self, key: &str) -> Option<i64> {
        self.slot(key).map(|slot| *slot)
    }

    fn slot(&self, key: &str) -> Option<&i64> {
        let slot = match key {
            "fitnessPass" => &self.fitness_pass,
            "fitnessWarn" => &self.fitness_warn,
            "fitnessFail" => &self.fitness_fail,
            "lowMileage" => &self.low_mileage,
            "highMileage" => &self.high_mileage,
            "brandingHigh" => &self.branding_high,
            "brandingMedium" => &self.branding_medium,
            "brandingLow" => &self.branding_low,
            "cleaningCompleted" => &self.cleaning_completed,
            "cleaningPending" => &self.cleaning_pending,
            "cleaningOverdue" => &self.cleaning_overdue,
            "jobCardClear" => &self.job_card_clear,
            "jobCardOpen" => &self.job_card_open,
            "conflictHighPenalty" => &self.conflict_high_penalty,
            "conflictMediumPenalty" => &self.conflict_medium_penalty,
            "conflictLowPenalty" => &self.conflict_low_penalty,
            "explanationBlockerPenalty" => &self.explanation_blocker_penalty,
            "explanationWarningPenalty" => &self.explanation_warning_penalty,
            "manualOverridePenalty" => &self.manual_override_penalty,
            _ => return None,
        };
        Some(slot)
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut i64> {
        let slot = match key {
            "fitnessPass" => &mut self.fitness_pass,
            "fitnessWarn" => &mut self.fitness_warn,
            "fitnessFail" => &mut self.fitness_fail,
            "lowMileage" => &mut self.low_mileage,
            "highMileage" => &mut self.high_mileage,
            "brandingHigh" => &mut self.branding_high,
            "brandingMedium" => &mut self.branding_medium,
            "brandingLow" => &mut self.branding_low,
            "cleaningCompleted" => &mut self.cleaning_completed,
            "cleaningPending" => &mut self.cleaning_pending,
            "cleaningOverdue" => &mut self.cleaning_overdue,
            "jobCardClear" => &mut self.job_card_clear,
            "jobCardOpen" => &mut self.job_card_open,
            "conflictHighPenalty" => &mut self.conflict_high_penalty,
            "conflictMediumPenalty" => &mut self.conflict_medium_penalty,
            "conflictLowPenalty" => &mut self.conflict_low_penalty,
            "explanationBlockerPenalty" => &mut self.explanation_blocker_penalty,
            "explanationWarningPenalty" => &mut self.explanation_warning_penalty,
            "manualOverridePenalty" => &mut self.manual_override_penalty,
            _ => return None,
        };
        Some(slot)
    }

    /// Copy with every weight pulled into `±MAX_WEIGHT_MAGNITUDE`.
    pub fn clamped(&self) -> Self {
        let mut weights = *self;
        for key in Self::KEYS {
            if let Some(slot) = weights.slot_mut(key) {
                *slot = (*slot).clamp(-MAX_WEIGHT_MAGNITUDE, MAX_WEIGHT_MAGNITUDE);
            }
        }
        weights
    }

    /// Layer a partial override on top of these weights, key by key.
    ///
    /// Keys that are unknown or carry an unusable value are skipped and the
    /// current value is kept; the report lists what was applied and skipped.
    pub fn with_overrides(&self, overrides: &Map<String, Value>) -> (Self, WeightOverrideReport) {
        let mut weights = *self;
        let mut report = WeightOverrideReport::default();

        for (key, value) in overrides {
            let Some(slot) = weights.slot_mut(key) else {
                report.ignored.push(IgnoredWeight {
                    key: key.clone(),
                    reason: IgnoredWeightReason::UnknownKey,
                });
                continue;
            };

            match coerce_weight(value) {
                Ok(weight) => {
                    *slot = weight;
                    report.applied.push(key.clone());
                }
                Err(reason) => report.ignored.push(IgnoredWeight {
                    key: key.clone(),
                    reason,
                }),
            }
        }

        (weights, report)
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::BASELINE
    }
}

/// Outcome of applying a partial weight override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeightOverrideReport {
    pub applied: Vec<String>,
    pub ignored: Vec<IgnoredWeight>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IgnoredWeight {
    pub key: String,
    pub reason: IgnoredWeightReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredWeightReason {
    UnknownKey,
    NotNumeric,
    NotFinite,
    NotInteger,
    OutOfRange,
}

impl IgnoredWeightReason {
    pub const fn label(self) -> &'static str {
        match self {
            Self::UnknownKey => "unknown weight key",
            Self::NotNumeric => "value is not numeric",
            Self::NotFinite => "value is not finite",
            Self::NotInteger => "value is not a whole number",
            Self::OutOfRange => "value is out of range",
        }
    }
}

fn coerce_weight(value: &Value) -> Result<i64, IgnoredWeightReason> {
    let weight = parse_weight(value)?;
    if weight.unsigned_abs() > MAX_WEIGHT_MAGNITUDE.unsigned_abs() {
        return Err(IgnoredWeightReason::OutOfRange);
    }
    Ok(weight)
}

fn parse_weight(value: &Value) -> Result<i64, IgnoredWeightReason> {
    match value {
        Value::Number(number) => {
            if let Some(weight) = number.as_i64() {
                return Ok(weight);
            }
            if number.is_u64() {
                return Err(IgnoredWeightReason::OutOfRange);
            }
            number
                .as_f64()
                .ok_or(IgnoredWeightReason::NotNumeric)
                .and_then(coerce_float)
        }
        Value::String(text) => {
            let trimmed = text.trim();
            if let Ok(weight) = trimmed.parse::<i64>() {
                return Ok(weight);
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| IgnoredWeightReason::NotNumeric)
                .and_then(coerce_float)
        }
        _ => Err(IgnoredWeightReason::NotNumeric),
    }
}

fn coerce_float(value: f64) -> Result<i64, IgnoredWeightReason> {
    if !value.is_finite() {
        return Err(IgnoredWeightReason::NotFinite);
    }
    if value.fract() != 0.0 {
        return Err(IgnoredWeightReason::NotInteger);
    }
    if value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(IgnoredWeightReason::OutOfRange);
    }
    Ok(value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn overrides(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn baseline_matches_published_table() {
        let encoded = serde_json::to_value(ScoringWeights::BASELINE).expect("serializes");
        assert_eq!(
            encoded,
            json!({
                "fitnessPass": 10, "fitnessWarn": -5, "fitnessFail": -20,
                "lowMileage": 8, "highMileage": -6,
                "brandingHigh": 6, "brandingMedium": 2, "brandingLow": 0,
                "cleaningCompleted": 4, "cleaningPending": 0, "cleaningOverdue": -4,
                "jobCardClear": 5, "jobCardOpen": -8,
                "conflictHighPenalty": -25, "conflictMediumPenalty": -10, "conflictLowPenalty": -3,
                "explanationBlockerPenalty": -8, "explanationWarningPenalty": -2,
                "manualOverridePenalty": -1
            })
        );
    }

    #[test]
    fn every_whitelisted_key_is_addressable() {
        for key in ScoringWeights::KEYS {
            assert!(ScoringWeights::BASELINE.get(key).is_some(), "{key}");
        }
        assert_eq!(ScoringWeights::BASELINE.get("fitnessPass"), Some(10));
        assert_eq!(ScoringWeights::BASELINE.get("bogus"), None);
    }

    #[test]
    fn bad_keys_fall_back_without_failing_the_rest() {
        let (weights, report) = ScoringWeights::BASELINE.with_overrides(&overrides(json!({
            "fitnessPass": 12,
            "brandingHigh": "9",
            "lowMileage": "lots",
            "highMileage": 1.5,
            "jobCardOpen": null,
            "cleaningOverdue": 1e300,
            "notAWeight": 3
        })));

        assert_eq!(weights.fitness_pass, 12);
        assert_eq!(weights.branding_high, 9);
        assert_eq!(weights.low_mileage, 8);
        assert_eq!(weights.high_mileage, -6);
        assert_eq!(weights.job_card_open, -8);
        assert_eq!(weights.cleaning_overdue, -4);
        assert_eq!(report.applied, vec!["brandingHigh", "fitnessPass"]);

        let reason_for = |key: &str| {
            report
                .ignored
                .iter()
                .find(|ignored| ignored.key == key)
                .map(|ignored| ignored.reason)
        };
        assert_eq!(reason_for("lowMileage"), Some(IgnoredWeightReason::NotNumeric));
        assert_eq!(reason_for("highMileage"), Some(IgnoredWeightReason::NotInteger));
        assert_eq!(reason_for("jobCardOpen"), Some(IgnoredWeightReason::NotNumeric));
        assert_eq!(reason_for("cleaningOverdue"), Some(IgnoredWeightReason::OutOfRange));
        assert_eq!(reason_for("notAWeight"), Some(IgnoredWeightReason::UnknownKey));
    }

    #[test]
    fn weights_beyond_the_magnitude_cap_are_rejected() {
        let (weights, report) = ScoringWeights::BASELINE.with_overrides(&overrides(json!({
            "fitnessPass": MAX_WEIGHT_MAGNITUDE,
            "fitnessFail": -MAX_WEIGHT_MAGNITUDE - 1,
            "jobCardClear": i64::MAX / 2,
            "brandingHigh": "2000000"
        })));

        assert_eq!(weights.fitness_pass, MAX_WEIGHT_MAGNITUDE);
        assert_eq!(weights.fitness_fail, -20);
        assert_eq!(weights.job_card_clear, 5);
        assert_eq!(weights.branding_high, 6);
        assert_eq!(report.applied, vec!["fitnessPass"]);
        assert_eq!(report.ignored.len(), 3);
        assert!(report
            .ignored
            .iter()
            .all(|ignored| ignored.reason == IgnoredWeightReason::OutOfRange));
    }

    #[test]
    fn clamped_pulls_every_weight_into_range() {
        let weights = ScoringWeights {
            fitness_pass: i64::MAX,
            manual_override_penalty: i64::MIN,
            ..ScoringWeights::BASELINE
        }
        .clamped();

        assert_eq!(weights.fitness_pass, MAX_WEIGHT_MAGNITUDE);
        assert_eq!(weights.manual_override_penalty, -MAX_WEIGHT_MAGNITUDE);
        assert_eq!(weights.job_card_clear, 5);
    }

    #[test]
    fn non_finite_strings_are_rejected() {
        let (weights, report) = ScoringWeights::BASELINE
            .with_overrides(&overrides(json!({ "fitnessFail": "NaN", "fitnessWarn": "inf" })));

        assert_eq!(weights, ScoringWeights::BASELINE);
        assert!(report
            .ignored
            .iter()
            .all(|ignored| ignored.reason == IgnoredWeightReason::NotFinite));
    }

    #[test]
    fn whole_floats_are_accepted() {
        let (weights, _) =
            ScoringWeights::BASELINE.with_overrides(&overrides(json!({ "brandingLow": -3.0 })));
        assert_eq!(weights.branding_low, -3);
    }
}
