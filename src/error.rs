use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures reported by a page driver.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("query `{selector}` failed: {message}")]
    Query { selector: String, message: String },

    #[error("element interaction failed: {0}")]
    Interaction(String),

    #[error(transparent)]
    Cdp(#[from] chromiumoxide::error::CdpError),
}

/// A date string the normalizer could not read.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("unrecognized date {0:?}")]
pub struct DateError(pub String);

/// Per-container failure. The harvester logs it and moves on.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("no element matches `{selector}`")]
    Missing { selector: String },

    #[error(transparent)]
    Date(#[from] DateError),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize reviews: {0}")]
    Json(#[from] serde_json::Error),

    /// One or more formats failed; the rest were still written.
    #[error("{} export(s) failed: {}", .0.len(), join_errors(.0))]
    Partial(Vec<ExportError>),
}

fn join_errors(errors: &[ExportError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("analysis API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("analysis run ended as {status}: {message}")]
    RunFailed { status: String, message: String },

    #[error("analysis run did not finish within {0:?}")]
    Timeout(Duration),

    #[error("analysis produced no text response")]
    EmptyResponse,
}
