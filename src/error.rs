use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the statistics core (selection, aggregation, normalization).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("no records for department '{0}'")]
    EmptyResult(String),

    #[error("no municipality '{municipality}' in department '{department}'")]
    NotFound {
        department: String,
        municipality: String,
    },

    #[error("{count} records match '{municipality}' in '{department}'")]
    AmbiguousMatch {
        department: String,
        municipality: String,
        count: usize,
    },

    #[error("rate unavailable for '{0}': total population is zero")]
    DivisionUndefined(String),

    #[error("cannot normalize a constant field (every value is {0})")]
    DegenerateRange(f64),
}

/// Errors raised while loading the input files. All of them are fatal.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("line {line}: {message}")]
    MalformedRow { line: u64, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(String),

    #[error("dataset contains no records")]
    Empty,
}
