//! Race request validation and response shape
//!
//! Callers supply raw `start`, `end`, `timeout` and `workers` values. Every
//! problem is collected into one error list instead of failing on the first,
//! and the race result is rendered as a JSON object:
//!
//! ```json
//! {"result": ["Gray wolf", "Canada"], "time": 1.2, "network": 0.4}
//! {"result": "No possible path.", "time": 3.0}
//! {"errors": ["please specify a start page"]}
//! ```

use crate::config::{RaceConfig, MAX_TIMEOUT_SECS, MAX_WORKERS};
use crate::race::{RaceOutcome, RaceParams, RaceReport};
use crate::InputError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Message returned when the forward side exhausts every page
pub const NO_PATH_MESSAGE: &str = "No possible path.";

/// Message returned when the race hits its deadline
pub const TIMEOUT_MESSAGE: &str = "Timed out.";

/// Unvalidated race parameters as received from a caller
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RaceRequest {
    pub start: Option<String>,
    pub end: Option<String>,
    pub timeout: Option<String>,
    pub workers: Option<String>,
}

impl RaceRequest {
    /// Validates the request, filling unspecified values from `defaults`
    ///
    /// # Returns
    ///
    /// * `Ok(RaceParams)` - Every value is present and in range
    /// * `Err(Vec<InputError>)` - All problems found, in field order
    pub fn validate(&self, defaults: &RaceConfig) -> Result<RaceParams, Vec<InputError>> {
        let mut errors = Vec::new();

        let start = non_empty(&self.start);
        if start.is_none() {
            errors.push(InputError::MissingStart);
        }

        let end = non_empty(&self.end);
        if end.is_none() {
            errors.push(InputError::MissingEnd);
        }

        let timeout = match &self.timeout {
            None => Some(defaults.timeout),
            Some(raw) => match parse_bounded(raw, MAX_TIMEOUT_SECS as i64) {
                Ok(value) => Some(value as u64),
                Err(Bound::NotInteger) => {
                    errors.push(InputError::TimeoutNotInteger(raw.clone()));
                    None
                }
                Err(Bound::OutOfRange(value)) => {
                    errors.push(InputError::TimeoutOutOfRange(value));
                    None
                }
            },
        };

        let workers = match &self.workers {
            None => Some(defaults.workers),
            Some(raw) => match parse_bounded(raw, MAX_WORKERS as i64) {
                Ok(value) => Some(value as usize),
                Err(Bound::NotInteger) => {
                    errors.push(InputError::WorkersNotInteger(raw.clone()));
                    None
                }
                Err(Bound::OutOfRange(value)) => {
                    errors.push(InputError::WorkersOutOfRange(value));
                    None
                }
            },
        };

        match (start, end, timeout, workers) {
            (Some(start), Some(end), Some(timeout), Some(workers)) if errors.is_empty() => {
                Ok(RaceParams {
                    start,
                    end,
                    timeout: Duration::from_secs(timeout),
                    workers,
                })
            }
            _ => Err(errors),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

enum Bound {
    NotInteger,
    OutOfRange(i64),
}

/// Parses an integer in `1..=max`
fn parse_bounded(raw: &str, max: i64) -> Result<i64, Bound> {
    let value: i64 = raw.trim().parse().map_err(|_| Bound::NotInteger)?;
    if value < 1 || value > max {
        return Err(Bound::OutOfRange(value));
    }
    Ok(value)
}

/// The `result` field: a path or a status message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RaceResult {
    Path(Vec<String>),
    Message(String),
}

/// JSON response for one race request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RaceResult>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,

    /// Wall-clock seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,

    /// Halved sum of both sides' network seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_forward: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_backward: Option<f64>,
}

impl RaceResponse {
    /// Builds an error response from accumulated input errors
    pub fn from_errors(errors: &[InputError]) -> Self {
        Self {
            errors: errors.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    /// Builds the response for a finished race
    pub fn from_report(report: &RaceReport) -> Self {
        let time = Some(report.elapsed.as_secs_f64());

        match &report.outcome {
            RaceOutcome::Found { path } => Self {
                result: Some(RaceResult::Path(path.clone())),
                time,
                network: Some(report.network_time().as_secs_f64()),
                network_forward: Some(report.forward_network.as_secs_f64()),
                network_backward: Some(report.backward_network.as_secs_f64()),
                ..Self::default()
            },
            RaceOutcome::NoPath => Self {
                result: Some(RaceResult::Message(NO_PATH_MESSAGE.to_string())),
                time,
                network: Some(report.network_time().as_secs_f64()),
                ..Self::default()
            },
            RaceOutcome::TimedOut => Self {
                result: Some(RaceResult::Message(TIMEOUT_MESSAGE.to_string())),
                time,
                ..Self::default()
            },
            RaceOutcome::Failed { errors } => Self {
                errors: errors.clone(),
                time,
                ..Self::default()
            },
        }
    }
}
