use std::path::PathBuf;
use thiserror::Error;

/// An input file could not be read as a table. Fatal for the run.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} has no header row")]
    Empty { path: PathBuf },
}

/// A stage's required columns are absent. The stage is skipped.
#[derive(Debug, Error, PartialEq)]
#[error("missing required columns in {source_name}: {}", .missing.join(", "))]
pub struct MissingColumns {
    pub source_name: String,
    pub missing: Vec<String>,
}
