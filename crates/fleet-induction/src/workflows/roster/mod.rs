//! Fleet roster CSV import producing validated trainset snapshots.

mod parser;

use crate::workflows::induction::domain::{SnapshotError, TrainsetId, TrainsetSnapshot};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum RosterImportError {
    #[error("failed to read fleet roster: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid fleet roster CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("roster row {row}: {source}")]
    InvalidRow { row: usize, source: SnapshotError },
    #[error("roster row {row}: duplicate trainset id {id}")]
    DuplicateId { row: usize, id: TrainsetId },
}

/// Eight-trainset roster shipped with the crate for demos and local serving.
pub const SAMPLE_ROSTER: &str = include_str!("../../../fleet_roster.csv");

pub struct RosterImporter;

impl RosterImporter {
    pub fn sample() -> Result<Vec<TrainsetSnapshot>, RosterImportError> {
        Self::from_reader(SAMPLE_ROSTER.as_bytes())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<TrainsetSnapshot>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse every row, stopping at the first invalid one. Rows are 1-based,
    /// not counting the header.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<TrainsetSnapshot>, RosterImportError> {
        let mut seen: HashSet<TrainsetId> = HashSet::new();
        let mut snapshots = Vec::new();

        for (index, row) in parser::parse_rows(reader)?.into_iter().enumerate() {
            let row_number = index + 1;
            let snapshot = row
                .into_record()
                .and_then(TrainsetSnapshot::try_from)
                .map_err(|source| RosterImportError::InvalidRow {
                    row: row_number,
                    source,
                })?;

            if !seen.insert(snapshot.id.clone()) {
                return Err(RosterImportError::DuplicateId {
                    row: row_number,
                    id: snapshot.id,
                });
            }
            snapshots.push(snapshot);
        }

        Ok(snapshots)
    }
}
