//! In-memory shift/task collections and the assignment operations on them.
//!
//! # Responsibility
//! - Hold both live collections in display order (most recent sync first).
//! - Apply claim, cancel, edit and cascading delete.
//! - Derive the read-side projections the household views need.
//!
//! # Invariants
//! - `delete_shift` removes the shift and all of its tasks in one call.
//! - Batch stamps handed out by `next_batch_stamp` strictly increase, so
//!   reconciled ids never collide with ids already on the board. Once the
//!   stamp space is used up no further stamp is issued.
//! - Operations on unknown ids are no-ops.

use crate::extract::ExtractionResult;
use crate::model::member::MemberId;
use crate::model::shift::{FlightShift, ShiftId, ShiftPatch};
use crate::model::task::{CareTask, TaskId, TaskPatch};
use crate::repo::care_repo::CareCollections;
use crate::service::reconcile::{batch_stamp_of, reconcile, ReconciledBatch};

/// Outcome of a cascading shift deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    pub shift: FlightShift,
    pub removed_tasks: usize,
}

/// Staffing coverage across the whole board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageStats {
    pub shift_count: usize,
    pub task_count: usize,
    pub claimed_count: usize,
    /// Rounded share of claimed tasks; `0` when there are no tasks.
    pub percent: u8,
}

/// Counts of records merged by one sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeCounts {
    pub shifts: usize,
    pub tasks: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CareBoard {
    shifts: Vec<FlightShift>,
    tasks: Vec<CareTask>,
    last_batch_stamp: Option<u64>,
}

impl CareBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from persisted collections, keeping their order.
    ///
    /// Task parents count toward the last stamp too: a write interrupted
    /// between the two slots can leave tasks whose shift was never stored.
    pub fn from_collections(collections: CareCollections) -> Self {
        let shift_ids = collections.shifts.iter().map(|shift| &shift.id);
        let parent_ids = collections.tasks.iter().map(|task| &task.shift_id);
        let last_batch_stamp = shift_ids.chain(parent_ids).filter_map(batch_stamp_of).max();
        Self {
            shifts: collections.shifts,
            tasks: collections.tasks,
            last_batch_stamp,
        }
    }

    pub fn shifts(&self) -> &[FlightShift] {
        &self.shifts
    }

    pub fn tasks(&self) -> &[CareTask] {
        &self.tasks
    }

    /// Copies both collections out for persistence or rendering.
    pub fn snapshot(&self) -> CareCollections {
        CareCollections {
            shifts: self.shifts.clone(),
            tasks: self.tasks.clone(),
        }
    }

    pub fn shift(&self, shift_id: &ShiftId) -> Option<&FlightShift> {
        self.shifts.iter().find(|shift| &shift.id == shift_id)
    }

    pub fn task(&self, task_id: &TaskId) -> Option<&CareTask> {
        self.tasks.iter().find(|task| &task.id == task_id)
    }

    /// Returns a stamp greater than every stamp already used on this board.
    ///
    /// `None` when the last used stamp is `u64::MAX`; the board is left as is.
    pub fn next_batch_stamp(&mut self, now_millis: u64) -> Option<u64> {
        let stamp = match self.last_batch_stamp {
            Some(last) if now_millis <= last => last.checked_add(1)?,
            _ => now_millis,
        };
        self.last_batch_stamp = Some(stamp);
        Some(stamp)
    }

    /// Prepends a reconciled batch so the newest sync is listed first.
    pub fn merge_batch(&mut self, batch: ReconciledBatch) -> MergeCounts {
        let counts = MergeCounts {
            shifts: batch.shifts.len(),
            tasks: batch.tasks.len(),
        };
        let mut shifts = batch.shifts;
        shifts.append(&mut self.shifts);
        self.shifts = shifts;

        let mut tasks = batch.tasks;
        tasks.append(&mut self.tasks);
        self.tasks = tasks;
        counts
    }

    /// Reconciles `results` under a fresh stamp and merges them.
    ///
    /// `None` when no stamp is left; nothing is merged.
    pub fn ingest(
        &mut self,
        results: &[ExtractionResult],
        now_millis: u64,
    ) -> Option<MergeCounts> {
        let stamp = self.next_batch_stamp(now_millis)?;
        Some(self.merge_batch(reconcile(results, stamp)))
    }

    /// Assigns the task to `member_id`, replacing any previous assignee.
    pub fn claim(&mut self, task_id: &TaskId, member_id: &MemberId) -> bool {
        match self.task_mut(task_id) {
            Some(task) => {
                task.assigned_to = Some(member_id.clone());
                true
            }
            None => false,
        }
    }

    /// Clears the assignee regardless of who holds the task.
    pub fn cancel_claim(&mut self, task_id: &TaskId) -> bool {
        match self.task_mut(task_id) {
            Some(task) => {
                task.assigned_to = None;
                true
            }
            None => false,
        }
    }

    /// Removes the shift and every task that belongs to it.
    pub fn delete_shift(&mut self, shift_id: &ShiftId) -> Option<CascadeReport> {
        let position = self.shifts.iter().position(|shift| &shift.id == shift_id)?;
        let shift = self.shifts.remove(position);

        let before = self.tasks.len();
        self.tasks.retain(|task| &task.shift_id != shift_id);

        Some(CascadeReport {
            shift,
            removed_tasks: before - self.tasks.len(),
        })
    }

    pub fn edit_shift(&mut self, shift_id: &ShiftId, patch: &ShiftPatch) -> bool {
        match self.shifts.iter_mut().find(|shift| &shift.id == shift_id) {
            Some(shift) => {
                patch.apply(shift);
                true
            }
            None => false,
        }
    }

    pub fn edit_task(&mut self, task_id: &TaskId, patch: &TaskPatch) -> bool {
        match self.task_mut(task_id) {
            Some(task) => {
                patch.apply(task);
                true
            }
            None => false,
        }
    }

    pub fn tasks_for_shift<'a>(
        &'a self,
        shift_id: &'a ShiftId,
    ) -> impl Iterator<Item = &'a CareTask> + 'a {
        self.tasks
            .iter()
            .filter(move |task| &task.shift_id == shift_id)
    }

    pub fn open_tasks(&self) -> impl Iterator<Item = &CareTask> {
        self.tasks.iter().filter(|task| !task.is_claimed())
    }

    pub fn tasks_claimed_by<'a>(
        &'a self,
        member_id: &'a MemberId,
    ) -> impl Iterator<Item = &'a CareTask> + 'a {
        self.tasks
            .iter()
            .filter(move |task| task.is_claimed_by(member_id))
    }

    pub fn claimed_count(&self, member_id: &MemberId) -> usize {
        self.tasks_claimed_by(member_id).count()
    }

    pub fn coverage(&self) -> CoverageStats {
        let task_count = self.tasks.len();
        let claimed_count = self.tasks.iter().filter(|task| task.is_claimed()).count();
        let percent = if task_count == 0 {
            0
        } else {
            ((claimed_count as f64 / task_count as f64) * 100.0).round() as u8
        };
        CoverageStats {
            shift_count: self.shifts.len(),
            task_count,
            claimed_count,
            percent,
        }
    }

    fn task_mut(&mut self, task_id: &TaskId) -> Option<&mut CareTask> {
        self.tasks.iter_mut().find(|task| &task.id == task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::CareBoard;
    use crate::model::member::MemberId;
    use crate::model::shift::{FlightShift, ShiftId, ShiftStatus};
    use crate::model::task::{CareTask, TaskId, TaskType};
    use crate::repo::care_repo::CareCollections;

    fn shift(id: &str) -> FlightShift {
        FlightShift {
            id: ShiftId::new(id),
            flight_number: "LY1".to_string(),
            origin: "TLV".to_string(),
            destination: "ATH".to_string(),
            departure_time: "06:00".to_string(),
            arrival_time: "08:00".to_string(),
            date_label: "01/11".to_string(),
            care_start: "05:00".to_string(),
            care_end: "09:00".to_string(),
            status: ShiftStatus::Pending,
        }
    }

    #[test]
    fn next_batch_stamp_is_strictly_increasing() {
        let mut board = CareBoard::new();
        assert_eq!(board.next_batch_stamp(100), Some(100));
        assert_eq!(board.next_batch_stamp(100), Some(101));
        assert_eq!(board.next_batch_stamp(50), Some(102));
        assert_eq!(board.next_batch_stamp(500), Some(500));
    }

    #[test]
    fn loaded_board_resumes_after_highest_persisted_stamp() {
        let mut board = CareBoard::from_collections(CareCollections {
            shifts: vec![shift("s-900-0"), shift("s-1200-1"), shift("custom")],
            tasks: Vec::new(),
        });
        assert_eq!(board.next_batch_stamp(1000), Some(1201));
    }

    #[test]
    fn exhausted_stamp_space_issues_no_stamp() {
        let max_id = format!("s-{}-0", u64::MAX);
        let mut board = CareBoard::from_collections(CareCollections {
            shifts: vec![shift(&max_id)],
            tasks: Vec::new(),
        });
        assert_eq!(board.next_batch_stamp(1_700_000_000_000), None);
        assert_eq!(board.next_batch_stamp(u64::MAX), None);
        assert!(board.ingest(&[], 1).is_none());
        assert_eq!(board.shifts().len(), 1);
    }

    #[test]
    fn orphan_task_parents_raise_the_resume_stamp() {
        let mut board = CareBoard::from_collections(CareCollections {
            shifts: vec![shift("s-900-0")],
            tasks: vec![CareTask {
                id: TaskId::new("t-s-5000-0-0"),
                shift_id: ShiftId::new("s-5000-0"),
                task_type: TaskType::Pickup,
                description: "orphan".to_string(),
                time: "07:00".to_string(),
                date_label: "01/11".to_string(),
                assigned_to: None,
            }],
        });
        assert_eq!(board.next_batch_stamp(1000), Some(5001));
    }

    #[test]
    fn coverage_rounds_to_nearest_percent() {
        let mut board = CareBoard::new();
        assert_eq!(board.coverage().percent, 0);

        let results: Vec<crate::extract::ExtractionResult> = serde_json::from_str(
            r#"[{"flightNumber":"LY1","origin":"TLV","destination":"ATH","departureTime":"06:00",
                "arrivalTime":"08:00","dateLabel":"01/11","careStart":"05:00","careEnd":"09:00",
                "suggestedTasks":[
                  {"type":"pickup","description":"a","time":"05:30","dateLabel":"01/11"},
                  {"type":"meal","description":"b","time":"07:00","dateLabel":"01/11"},
                  {"type":"bath-and-bed","description":"c","time":"08:00","dateLabel":"01/11"}]}]"#,
        )
        .unwrap();
        board.ingest(&results, 1).unwrap();
        let first = board.tasks()[0].id.clone();
        board.claim(&first, &MemberId::new("g1"));

        let stats = board.coverage();
        assert_eq!(stats.shift_count, 1);
        assert_eq!(stats.task_count, 3);
        assert_eq!(stats.claimed_count, 1);
        assert_eq!(stats.percent, 33);
    }
}
