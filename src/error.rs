use std::path::PathBuf;

/// Failures of the dataset, training, and model subsystems.
///
/// None of these should take the game down: a missing model only disables the
/// coach, and training problems are reported after the terminal is restored.
#[derive(thiserror::Error, Debug)]
pub enum CoachError {
    #[error("dataset I/O failed for {path:?}: {source}")]
    DatasetIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not load model from {path:?}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    #[error("could not save model to {path:?}: {reason}")]
    ModelSave { path: PathBuf, reason: String },

    #[error("no usable rows in dataset {path:?} ({skipped} malformed rows skipped)")]
    EmptyDataset { path: PathBuf, skipped: usize },

    #[error("training failed: {0}")]
    Training(String),

    #[error("malformed dataset row at line {line}: {reason}")]
    InputValidation { line: usize, reason: String },
}

impl CoachError {
    pub(crate) fn dataset_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoachError::DatasetIo {
            path: path.into(),
            source,
        }
    }
}
