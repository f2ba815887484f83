// src/error.rs
use std::{io, path::PathBuf};

use thiserror::Error;

use crate::browser::BrowserError;

/// Failure of one pipeline stage. No stage recovers from another's failure.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Element never became visible/interactable within the retry budget.
    #[error("navigation failed during {step}: {source}")]
    Navigation {
        step: &'static str,
        #[source]
        source: BrowserError,
    },

    #[error("markup parse failed: {0}")]
    Parse(#[from] ParseError),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("browser session error: {0}")]
    Session(#[source] BrowserError),
}

/// Markup lacks the table structure the parser expects.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no <table> element in markup")]
    NoTable,
    #[error("header row has no <th> cells")]
    NoHeaderCells,
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
