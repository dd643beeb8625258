//! Typed extraction records and their validation.
//!
//! # Responsibility
//! - Define the structured shape returned by the extraction service.
//! - Reject malformed fields instead of coercing them.
//!
//! # Invariants
//! - Task types outside the known vocabulary fail deserialization.
//! - `validate()` accepts only 24h `H:MM` / `HH:MM` times.

use crate::model::task::TaskType;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static CLOCK_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]?[0-9]|2[0-3]):[0-5][0-9]$").expect("valid clock time regex"));

/// One care task suggested for an extracted shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedTask {
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub description: String,
    pub time: String,
    pub date_label: String,
}

/// One work event recognized by the extraction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub date_label: String,
    pub care_start: String,
    pub care_end: String,
    pub suggested_tasks: Vec<SuggestedTask>,
}

/// Field-level rejection of an extraction record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    BlankField { field: String },
    InvalidTime { field: String, value: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField { field } => write!(f, "field `{field}` must not be blank"),
            Self::InvalidTime { field, value } => {
                write!(f, "field `{field}` is not a HH:MM time: `{value}`")
            }
        }
    }
}

impl Error for ValidationError {}

impl ExtractionResult {
    /// Checks required text fields and clock times, including every
    /// suggested task.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("flightNumber", &self.flight_number)?;
        require_text("origin", &self.origin)?;
        require_text("destination", &self.destination)?;
        require_time("departureTime", &self.departure_time)?;
        require_time("arrivalTime", &self.arrival_time)?;
        require_time("careStart", &self.care_start)?;
        require_time("careEnd", &self.care_end)?;

        for (index, task) in self.suggested_tasks.iter().enumerate() {
            if task.description.trim().is_empty() {
                return Err(ValidationError::BlankField {
                    field: format!("suggestedTasks[{index}].description"),
                });
            }
            if !is_clock_time(&task.time) {
                return Err(ValidationError::InvalidTime {
                    field: format!("suggestedTasks[{index}].time"),
                    value: task.time.clone(),
                });
            }
        }
        Ok(())
    }
}

pub fn is_clock_time(value: &str) -> bool {
    CLOCK_TIME_RE.is_match(value.trim())
}

fn require_text(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn require_time(field: &str, value: &str) -> Result<(), ValidationError> {
    if !is_clock_time(value) {
        return Err(ValidationError::InvalidTime {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}
