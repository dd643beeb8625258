//! Conversion of extraction results into domain records.
//!
//! # Responsibility
//! - Build one `FlightShift` per result and one `CareTask` per suggested task.
//! - Generate ids that are unique within a batch.
//!
//! # Invariants
//! - Shift id is `s-<batch stamp>-<result index>`.
//! - Task id is `t-<shift id>-<task index>` and its `shift_id` is the parent's id.
//! - New shifts start `Pending`; new tasks start unclaimed.

use crate::extract::ExtractionResult;
use crate::model::shift::{FlightShift, ShiftId, ShiftStatus};
use crate::model::task::{CareTask, TaskId};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of batch stamps (epoch milliseconds).
pub trait Clock {
    fn now_millis(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}

/// Clock that always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}

/// Records produced from one extraction batch, in result order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciledBatch {
    pub shifts: Vec<FlightShift>,
    pub tasks: Vec<CareTask>,
}

pub fn shift_id_for(batch_stamp: u64, index: usize) -> ShiftId {
    ShiftId::new(format!("s-{batch_stamp}-{index}"))
}

pub fn task_id_for(shift_id: &ShiftId, index: usize) -> TaskId {
    TaskId::new(format!("t-{shift_id}-{index}"))
}

/// Returns the batch stamp embedded in a reconciled shift id.
pub fn batch_stamp_of(shift_id: &ShiftId) -> Option<u64> {
    let rest = shift_id.as_str().strip_prefix("s-")?;
    let (stamp, index) = rest.split_once('-')?;
    index.parse::<usize>().ok()?;
    stamp.parse().ok()
}

/// Builds domain records for one batch.
pub fn reconcile(results: &[ExtractionResult], batch_stamp: u64) -> ReconciledBatch {
    let mut batch = ReconciledBatch::default();

    for (index, result) in results.iter().enumerate() {
        let shift_id = shift_id_for(batch_stamp, index);

        batch
            .tasks
            .extend(
                result
                    .suggested_tasks
                    .iter()
                    .enumerate()
                    .map(|(task_index, suggested)| CareTask {
                        id: task_id_for(&shift_id, task_index),
                        shift_id: shift_id.clone(),
                        task_type: suggested.task_type,
                        description: suggested.description.clone(),
                        time: suggested.time.clone(),
                        date_label: suggested.date_label.clone(),
                        assigned_to: None,
                    }),
            );

        batch.shifts.push(FlightShift {
            id: shift_id,
            flight_number: result.flight_number.clone(),
            origin: result.origin.clone(),
            destination: result.destination.clone(),
            departure_time: result.departure_time.clone(),
            arrival_time: result.arrival_time.clone(),
            date_label: result.date_label.clone(),
            care_start: result.care_start.clone(),
            care_end: result.care_end.clone(),
            status: ShiftStatus::Pending,
        });
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::{batch_stamp_of, shift_id_for, task_id_for};
    use crate::model::shift::ShiftId;

    #[test]
    fn ids_embed_stamp_and_indexes() {
        let shift_id = shift_id_for(1700, 2);
        assert_eq!(shift_id.as_str(), "s-1700-2");
        assert_eq!(task_id_for(&shift_id, 0).as_str(), "t-s-1700-2-0");
    }

    #[test]
    fn batch_stamp_round_trips_through_shift_id() {
        assert_eq!(batch_stamp_of(&shift_id_for(42, 7)), Some(42));
        assert_eq!(batch_stamp_of(&ShiftId::new("manual")), None);
        assert_eq!(batch_stamp_of(&ShiftId::new("s-abc-0")), None);
    }
}
