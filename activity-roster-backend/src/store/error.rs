use std::path::PathBuf;

use thiserror::Error;

/// Caller-facing outcomes of a roster operation. The display strings are
/// returned verbatim as the `detail` of an error response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("Activity not found")]
    NotFound,
    #[error("{email} already signed up for {activity}")]
    AlreadyEnrolled { email: String, activity: String },
    #[error("{email} is not registered for {activity}")]
    NotEnrolled { email: String, activity: String },
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("activity {activity} must allow at least one participant")]
    ZeroCapacity { activity: String },
    #[error("{email} is listed more than once for {activity}")]
    DuplicateParticipant { activity: String, email: String },
    #[error("activity {0} is defined more than once")]
    DuplicateActivity(String),
}
