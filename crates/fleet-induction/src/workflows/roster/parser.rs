use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::io::Read;

use crate::workflows::induction::domain::{SnapshotError, TrainsetRecord};

#[derive(Debug, Deserialize)]
pub(crate) struct RosterRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    recommendation: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    reason: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    mileage_km: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    branding_priority: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    job_card_open: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    cleaning_status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rolling_stock: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rolling_stock_details: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    signalling: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    signalling_details: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    telecom: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    telecom_details: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    manual_override: Option<String>,
}

impl RosterRow {
    /// Lift the flat CSV row into the wire record validated by the snapshot type.
    pub(crate) fn into_record(self) -> Result<TrainsetRecord, SnapshotError> {
        let job_card_open = self
            .job_card_open
            .as_deref()
            .map(|raw| parse_flag("jobCardOpen", raw))
            .transpose()?;
        let manual_override = self
            .manual_override
            .as_deref()
            .map(|raw| parse_flag("manualOverride", raw))
            .transpose()?;

        let check = |status: Option<String>, details: Option<String>| {
            json!({ "status": status, "details": details })
        };

        Ok(TrainsetRecord {
            id: self.id.map(Value::String),
            recommendation: self.recommendation.map(Value::String),
            reason: self.reason.map(Value::String),
            mileage_km: self.mileage_km.map(Value::String),
            branding_priority: self.branding_priority.map(Value::String),
            job_card_open: job_card_open.map(Value::Bool),
            cleaning_status: self.cleaning_status.map(Value::String),
            fitness: Some(json!({
                "rollingStock": check(self.rolling_stock, self.rolling_stock_details),
                "signalling": check(self.signalling, self.signalling_details),
                "telecom": check(self.telecom, self.telecom_details),
            })),
            manual_override: manual_override.map(Value::Bool),
        })
    }
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<RosterRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader.deserialize::<RosterRow>().collect()
}

fn parse_flag(field: &str, raw: &str) -> Result<bool, SnapshotError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(SnapshotError::InvalidField {
            field: field.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
