//! Append-only CSV dataset of feature records
//!
//! The file carries a single header row written when it is first created.
//! Rows are only ever appended; loading skips malformed rows and reports how
//! many were dropped rather than failing.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::CoachError;

use super::features::FeatureRecord;

/// Records read back from disk
#[derive(Debug, Default)]
pub struct LoadedDataset {
    pub records: Vec<FeatureRecord>,
    /// Rows dropped because of wrong arity or values
    pub skipped: usize,
}

impl LoadedDataset {
    pub fn positives(&self) -> usize {
        self.records.iter().filter(|r| r.is_collision()).count()
    }
}

/// Handle to the dataset file
#[derive(Debug, Clone)]
pub struct Dataset {
    path: PathBuf,
}

impl Dataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append rows, writing the header first if the file is new or empty
    pub fn append(&self, records: &[FeatureRecord]) -> Result<(), CoachError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| CoachError::dataset_io(parent, e))?;
            }
        }

        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(CoachError::dataset_io(&self.path, e)),
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| CoachError::dataset_io(&self.path, e))?;
        let mut writer = BufWriter::new(file);

        let io = |e| CoachError::dataset_io(&self.path, e);
        if needs_header {
            writeln!(writer, "{}", FeatureRecord::HEADER).map_err(io)?;
        }
        for record in records {
            writeln!(writer, "{}", record.to_csv_row()).map_err(io)?;
        }
        writer.flush().map_err(io)?;

        debug!(rows = records.len(), path = ?self.path, "appended dataset rows");
        Ok(())
    }

    /// Read every well-formed row. A missing file is an empty dataset.
    pub fn load(&self) -> Result<LoadedDataset, CoachError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(LoadedDataset::default());
            }
            Err(e) => return Err(CoachError::dataset_io(&self.path, e)),
        };

        let mut loaded = LoadedDataset::default();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| CoachError::dataset_io(&self.path, e))?;
            let row = line.trim();
            if row.is_empty() || row == FeatureRecord::HEADER {
                continue;
            }

            match FeatureRecord::parse_csv_row(row, index + 1) {
                Ok(record) => loaded.records.push(record),
                Err(err) => {
                    warn!(%err, "skipping dataset row");
                    loaded.skipped += 1;
                }
            }
        }

        Ok(loaded)
    }
}
