//! Care task domain model.
//!
//! # Responsibility
//! - Define one unit of requested child care tied to a shift.
//! - Expose claim state helpers and field-level merge semantics.
//!
//! # Invariants
//! - `shift_id` references an existing shift at creation time.
//! - `assigned_to == None` means the task is unclaimed.
//! - Field edits never touch `id`, `shift_id` or `assigned_to`.

use crate::model::member::MemberId;
use crate::model::shift::{merge, ShiftId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stable identifier of a task (`t-<shift id>-<index>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Kind of care activity.
///
/// Serialized as kebab-case English; the Hebrew labels produced by the
/// extraction prompt are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    #[serde(alias = "איסוף")]
    Pickup,
    #[serde(alias = "ארוחה")]
    Meal,
    #[serde(alias = "מקלחת והשכבה")]
    BathAndBed,
    #[serde(alias = "לינה")]
    Overnight,
    #[serde(alias = "עזרה כללית")]
    GeneralHelp,
}

impl TaskType {
    pub const ALL: [TaskType; 5] = [
        Self::Pickup,
        Self::Meal,
        Self::BathAndBed,
        Self::Overnight,
        Self::GeneralHelp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Meal => "meal",
            Self::BathAndBed => "bath-and-bed",
            Self::Overnight => "overnight",
            Self::GeneralHelp => "general-help",
        }
    }

    pub fn label_he(self) -> &'static str {
        match self {
            Self::Pickup => "איסוף",
            Self::Meal => "ארוחה",
            Self::BathAndBed => "מקלחת והשכבה",
            Self::Overnight => "לינה",
            Self::GeneralHelp => "עזרה כללית",
        }
    }

    /// Parses either the English wire name or the Hebrew label.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == trimmed || kind.label_he() == trimmed)
    }
}

impl Display for TaskType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of requested care during a shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareTask {
    pub id: TaskId,
    pub shift_id: ShiftId,
    pub task_type: TaskType,
    pub description: String,
    pub time: String,
    pub date_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<MemberId>,
}

impl CareTask {
    pub fn is_claimed(&self) -> bool {
        self.assigned_to.is_some()
    }

    pub fn is_claimed_by(&self, member_id: &MemberId) -> bool {
        self.assigned_to.as_ref() == Some(member_id)
    }
}

/// Partial task edit. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub task_type: Option<TaskType>,
    pub description: Option<String>,
    pub time: Option<String>,
    pub date_label: Option<String>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply(&self, task: &mut CareTask) {
        if let Some(task_type) = self.task_type {
            task.task_type = task_type;
        }
        merge(&mut task.description, &self.description);
        merge(&mut task.time, &self.time);
        merge(&mut task.date_label, &self.date_label);
    }
}

#[cfg(test)]
mod tests {
    use super::{CareTask, TaskId, TaskPatch, TaskType};
    use crate::model::member::MemberId;
    use crate::model::shift::ShiftId;

    fn sample() -> CareTask {
        CareTask {
            id: TaskId::new("t-s-1-0-0"),
            shift_id: ShiftId::new("s-1-0"),
            task_type: TaskType::Pickup,
            description: "pickup".to_string(),
            time: "13:30".to_string(),
            date_label: "25/10".to_string(),
            assigned_to: None,
        }
    }

    #[test]
    fn task_type_accepts_hebrew_and_english() {
        let hebrew: TaskType = serde_json::from_str("\"מקלחת והשכבה\"").unwrap();
        let english: TaskType = serde_json::from_str("\"bath-and-bed\"").unwrap();
        assert_eq!(hebrew, TaskType::BathAndBed);
        assert_eq!(english, TaskType::BathAndBed);
        assert_eq!(TaskType::parse(" לינה "), Some(TaskType::Overnight));
        assert_eq!(TaskType::parse("laundry"), None);
    }

    #[test]
    fn unclaimed_task_omits_assigned_to_in_json() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("assignedTo").is_none());
        assert_eq!(json["shiftId"], "s-1-0");
        assert_eq!(json["taskType"], "pickup");
    }

    #[test]
    fn claim_helpers_follow_assigned_to() {
        let mut task = sample();
        assert!(!task.is_claimed());
        task.assigned_to = Some(MemberId::new("g1"));
        assert!(task.is_claimed());
        assert!(task.is_claimed_by(&MemberId::new("g1")));
        assert!(!task.is_claimed_by(&MemberId::new("g2")));
    }

    #[test]
    fn patch_keeps_assignment_and_identity() {
        let mut task = sample();
        task.assigned_to = Some(MemberId::new("f1"));
        TaskPatch {
            task_type: Some(TaskType::Meal),
            time: Some("18:30".to_string()),
            ..TaskPatch::default()
        }
        .apply(&mut task);

        assert_eq!(task.task_type, TaskType::Meal);
        assert_eq!(task.time, "18:30");
        assert_eq!(task.description, "pickup");
        assert_eq!(task.assigned_to, Some(MemberId::new("f1")));
        assert_eq!(task.id, TaskId::new("t-s-1-0-0"));
    }
}
