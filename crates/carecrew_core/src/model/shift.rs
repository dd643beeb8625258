//! Flight shift domain model.
//!
//! # Responsibility
//! - Define the work period during which child care is needed.
//! - Provide field-level merge semantics for edits.
//!
//! # Invariants
//! - `id` is assigned at reconciliation time and never changes.
//! - `status` is written as `Pending` on creation; nothing transitions it yet.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stable identifier of a shift (`s-<batch stamp>-<index>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShiftId(String);

impl ShiftId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ShiftId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShiftId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Staffing lifecycle of a shift.
///
/// Hebrew aliases keep data written by earlier household app releases readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    #[default]
    #[serde(alias = "ממתין")]
    Pending,
    #[serde(alias = "מאויש")]
    Staffed,
    #[serde(alias = "הסתיים")]
    Finished,
}

/// One work period (flight) of the traveling parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightShift {
    pub id: ShiftId,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: String,
    pub arrival_time: String,
    /// Display-only date string, e.g. `25/10/2024`.
    pub date_label: String,
    /// Start of the care window, computed by the extraction service.
    pub care_start: String,
    pub care_end: String,
    #[serde(default)]
    pub status: ShiftStatus,
}

/// Partial shift edit. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShiftPatch {
    pub flight_number: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
    pub date_label: Option<String>,
    pub care_start: Option<String>,
    pub care_end: Option<String>,
    pub status: Option<ShiftStatus>,
}

impl ShiftPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Merges present fields into `shift`.
    ///
    /// No validation is applied; a blank flight number is accepted.
    pub fn apply(&self, shift: &mut FlightShift) {
        merge(&mut shift.flight_number, &self.flight_number);
        merge(&mut shift.origin, &self.origin);
        merge(&mut shift.destination, &self.destination);
        merge(&mut shift.departure_time, &self.departure_time);
        merge(&mut shift.arrival_time, &self.arrival_time);
        merge(&mut shift.date_label, &self.date_label);
        merge(&mut shift.care_start, &self.care_start);
        merge(&mut shift.care_end, &self.care_end);
        if let Some(status) = self.status {
            shift.status = status;
        }
    }
}

pub(crate) fn merge(target: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        target.clone_from(value);
    }
}

#[cfg(test)]
mod tests {
    use super::{FlightShift, ShiftId, ShiftPatch, ShiftStatus};

    fn sample() -> FlightShift {
        FlightShift {
            id: ShiftId::new("s-1-0"),
            flight_number: "LY315".to_string(),
            origin: "TLV".to_string(),
            destination: "LHR".to_string(),
            departure_time: "14:00".to_string(),
            arrival_time: "18:00".to_string(),
            date_label: "25/10".to_string(),
            care_start: "13:00".to_string(),
            care_end: "19:00".to_string(),
            status: ShiftStatus::Pending,
        }
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut shift = sample();
        let patch = ShiftPatch {
            destination: Some("CDG".to_string()),
            care_end: Some("20:00".to_string()),
            ..ShiftPatch::default()
        };
        patch.apply(&mut shift);

        assert_eq!(shift.destination, "CDG");
        assert_eq!(shift.care_end, "20:00");
        assert_eq!(shift.origin, "TLV");
        assert_eq!(shift.id, ShiftId::new("s-1-0"));
    }

    #[test]
    fn patch_accepts_blank_flight_number() {
        let mut shift = sample();
        ShiftPatch {
            flight_number: Some(String::new()),
            ..ShiftPatch::default()
        }
        .apply(&mut shift);
        assert!(shift.flight_number.is_empty());
    }

    #[test]
    fn status_reads_hebrew_alias() {
        let status: ShiftStatus = serde_json::from_str("\"ממתין\"").unwrap();
        assert_eq!(status, ShiftStatus::Pending);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"pending\"");
    }
}
