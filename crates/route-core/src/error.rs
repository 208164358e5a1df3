//! Error types for route editing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::EditIntent;

/// Failure reported by a geometry adapter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("geometry service could not resolve a path: {0}")]
    Unavailable(String),
    #[error("invalid coordinate ({lon}, {lat})")]
    InvalidCoordinate { lon: f64, lat: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("waypoint index {index} out of range for {len} waypoints")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("invalid waypoint: {source}")]
    InvalidWaypoint {
        #[source]
        source: GeometryError,
    },
    #[error("geometry unavailable for segment {segment}: {source}")]
    GeometryUnavailable {
        segment: usize,
        #[source]
        source: GeometryError,
    },
    #[error("commit prepared against revision {prepared} but store is at {current}")]
    StaleCommit { prepared: u64, current: u64 },
    #[error("expected {expected} segment geometries, got {actual}")]
    GeometryCountMismatch { expected: usize, actual: usize },
}

/// User-visible, non-fatal notice that an edit was rolled back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEditFailed {
    pub intent: EditIntent,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl RouteEditFailed {
    pub fn new(intent: EditIntent, error: &RouteError) -> Self {
        Self {
            intent,
            message: error.to_string(),
            at: Utc::now(),
        }
    }
}
