use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading and filtering the source file.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("failed to open source '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed CSV in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("source '{path}' has no '{column}' column")]
    MissingDateColumn { path: PathBuf, column: String },

    #[error("unparseable date '{value}' on line {line}")]
    InvalidDate { line: u64, value: String },

    #[error("invalid cutoff date '{0}' (expected YYYY-MM-DD)")]
    InvalidCutoff(String),
}

/// Failures while reshaping a batch.
#[derive(Error, Debug)]
pub enum TransformationError {
    #[error("required column '{0}' is missing")]
    MissingColumn(String),

    #[error("columns {first:?} and {second:?} both normalize to '{normalized}'")]
    DuplicateColumn {
        first: String,
        second: String,
        normalized: String,
    },
}

/// Failures while writing to the destination table.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("unsupported destination '{0}' (expected a sqlite:// URI or a file path)")]
    UnsupportedDestination(String),

    #[error("invalid table name '{0}'")]
    InvalidTableName(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// A failed stage, as reported by the orchestrator.
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("transformation failed: {0}")]
    Transformation(#[from] TransformationError),

    #[error("load failed: {0}")]
    Load(#[from] LoadError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("environment variable {name} is invalid: {reason}")]
    InvalidVar { name: &'static str, reason: String },

    #[error("no cutoff date given and DEFAULT_CUTOFF_DATE is not set")]
    MissingCutoff,
}
