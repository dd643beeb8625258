//! Household use-case service.
//!
//! # Responsibility
//! - Own the live board and write it through the repository after every
//!   mutation.
//! - Run the sync flow: extraction, reconciliation, merge, persist.
//! - Guard administrative edits behind the roster's admin flag.
//!
//! # Invariants
//! - At most one sync is in flight; other mutations may interleave with it.
//! - A sync ticket completes only on the service that issued it.
//! - A failed sync commits nothing.
//! - Persistence is fire-and-forget: a failed write is logged and the
//!   in-memory mutation stands.

use crate::extract::{ExtractionError, ExtractionResult, Extractor, TextGenerator};
use crate::logging::sanitize_message;
use crate::model::member::{find_member, is_known_member, MemberId};
use crate::model::shift::{ShiftId, ShiftPatch};
use crate::model::task::{TaskId, TaskPatch};
use crate::repo::care_repo::{CareCollections, CareRepository, RepoError, RepoResult};
use crate::service::board::{CareBoard, CascadeReport, CoverageStats};
use crate::service::reconcile::{Clock, SystemClock};
use crate::store::KeyValueStore;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

const MAX_ERROR_LOG_CHARS: usize = 240;

static NEXT_SERVICE_ID: AtomicU64 = AtomicU64::new(1);

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    /// Acting id is not on the household roster.
    UnknownMember(MemberId),
    /// Acting member lacks the admin flag required for this operation.
    NotAdmin(MemberId),
    /// Another sync has started and not completed yet.
    SyncInProgress,
    /// The ticket was issued by a different service instance.
    ForeignTicket,
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::UnknownMember(id) => write!(f, "unknown family member: {id}"),
            Self::NotAdmin(id) => write!(f, "member {id} is not allowed to manage shifts"),
            Self::SyncInProgress => write!(f, "a sync is already in progress"),
            Self::ForeignTicket => write!(f, "sync ticket belongs to another service"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Proof that the caller holds the sync slot of one service instance.
/// Consumed by `complete_sync` on that same instance.
#[derive(Debug)]
#[must_use = "a started sync must be completed to clear the syncing flag"]
pub struct SyncTicket {
    service_id: u64,
}

/// Why a sync committed nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncFailure {
    /// The service could not be reached or refused the request; retryable.
    Transport(String),
    /// The service answered with text that is missing, not JSON, or invalid.
    Parse(String),
    /// Every batch stamp has been used; no new ids can be issued.
    IdsExhausted,
}

impl From<&ExtractionError> for SyncFailure {
    fn from(value: &ExtractionError) -> Self {
        if value.is_transport_failure() {
            Self::Transport(value.to_string())
        } else {
            Self::Parse(value.to_string())
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub added_shifts: usize,
    pub added_tasks: usize,
    pub failure: Option<SyncFailure>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

pub struct HouseholdService<S: KeyValueStore, C: Clock = SystemClock> {
    id: u64,
    repo: CareRepository<S>,
    board: CareBoard,
    clock: C,
    syncing: bool,
}

impl<S: KeyValueStore> HouseholdService<S, SystemClock> {
    /// Loads persisted collections using the wall clock for batch stamps.
    pub fn open(repo: CareRepository<S>) -> ServiceResult<Self> {
        Self::open_with_clock(repo, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> HouseholdService<S, C> {
    /// Loads both collections once; later reads come from memory.
    pub fn open_with_clock(repo: CareRepository<S>, clock: C) -> ServiceResult<Self> {
        let collections = repo.load()?;
        info!(
            "event=service_open module=service status=ok shifts={} tasks={}",
            collections.shifts.len(),
            collections.tasks.len()
        );
        Ok(Self {
            id: NEXT_SERVICE_ID.fetch_add(1, Ordering::Relaxed),
            repo,
            board: CareBoard::from_collections(collections),
            clock,
            syncing: false,
        })
    }

    pub fn board(&self) -> &CareBoard {
        &self.board
    }

    pub fn repository(&self) -> &CareRepository<S> {
        &self.repo
    }

    pub fn snapshot(&self) -> CareCollections {
        self.board.snapshot()
    }

    pub fn coverage(&self) -> CoverageStats {
        self.board.coverage()
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing
    }

    /// Assigns the task to the acting member (last write wins).
    pub fn claim(&mut self, task_id: &TaskId, acting: &MemberId) -> bool {
        if !is_known_member(acting) {
            warn!("event=task_claim module=service status=warn error_code=unknown_member");
        }
        let changed = self.board.claim(task_id, acting);
        self.after_mutation("task_claim", changed);
        changed
    }

    /// Clears the task's assignee unconditionally.
    pub fn cancel_claim(&mut self, task_id: &TaskId) -> bool {
        let changed = self.board.cancel_claim(task_id);
        self.after_mutation("task_cancel", changed);
        changed
    }

    /// Deletes a shift with its tasks. Confirmation happens upstream.
    pub fn delete_shift(
        &mut self,
        acting: &MemberId,
        shift_id: &ShiftId,
    ) -> ServiceResult<Option<CascadeReport>> {
        ensure_admin(acting)?;
        let report = self.board.delete_shift(shift_id);
        if let Some(report) = &report {
            info!(
                "event=shift_delete module=service status=ok removed_tasks={}",
                report.removed_tasks
            );
        }
        self.after_mutation("shift_delete", report.is_some());
        Ok(report)
    }

    pub fn edit_shift(
        &mut self,
        acting: &MemberId,
        shift_id: &ShiftId,
        patch: &ShiftPatch,
    ) -> ServiceResult<bool> {
        ensure_admin(acting)?;
        let changed = self.board.edit_shift(shift_id, patch);
        self.after_mutation("shift_edit", changed);
        Ok(changed)
    }

    pub fn edit_task(
        &mut self,
        acting: &MemberId,
        task_id: &TaskId,
        patch: &TaskPatch,
    ) -> ServiceResult<bool> {
        ensure_admin(acting)?;
        let changed = self.board.edit_task(task_id, patch);
        self.after_mutation("task_edit", changed);
        Ok(changed)
    }

    /// Marks a sync as in flight.
    pub fn begin_sync(&mut self) -> ServiceResult<SyncTicket> {
        if self.syncing {
            warn!("event=sync module=service status=rejected error_code=sync_in_progress");
            return Err(ServiceError::SyncInProgress);
        }
        self.syncing = true;
        info!("event=sync module=service status=start");
        Ok(SyncTicket {
            service_id: self.id,
        })
    }

    /// Finishes a sync with the extraction outcome and clears the flag.
    ///
    /// On success the whole batch is reconciled, prepended and persisted.
    /// On failure nothing is committed. A ticket from another service is
    /// rejected and leaves this service's syncing flag untouched.
    pub fn complete_sync(
        &mut self,
        ticket: SyncTicket,
        outcome: Result<Vec<ExtractionResult>, ExtractionError>,
    ) -> ServiceResult<SyncReport> {
        if ticket.service_id != self.id {
            warn!("event=sync module=service status=rejected error_code=foreign_ticket");
            return Err(ServiceError::ForeignTicket);
        }
        self.syncing = false;

        let results = match outcome {
            Ok(results) => results,
            Err(err) => {
                error!(
                    "event=sync module=service status=error error_code={} error={}",
                    err.code(),
                    sanitize_message(&err.to_string(), MAX_ERROR_LOG_CHARS)
                );
                return Ok(SyncReport {
                    failure: Some(SyncFailure::from(&err)),
                    ..SyncReport::default()
                });
            }
        };

        let Some(counts) = self.board.ingest(&results, self.clock.now_millis()) else {
            error!("event=sync module=service status=error error_code=ids_exhausted");
            return Ok(SyncReport {
                failure: Some(SyncFailure::IdsExhausted),
                ..SyncReport::default()
            });
        };
        info!(
            "event=sync module=service status=ok added_shifts={} added_tasks={}",
            counts.shifts, counts.tasks
        );
        self.after_mutation("sync", counts.shifts > 0);
        Ok(SyncReport {
            added_shifts: counts.shifts,
            added_tasks: counts.tasks,
            failure: None,
        })
    }

    /// Runs extraction for `events` and merges the results.
    pub fn sync<G: TextGenerator, E: AsRef<str>>(
        &mut self,
        extractor: &Extractor<G>,
        events: &[E],
    ) -> ServiceResult<SyncReport> {
        let ticket = self.begin_sync()?;
        let outcome = extractor.try_extract(events);
        self.complete_sync(ticket, outcome)
    }

    /// Writes both collections and reports the result.
    pub fn flush(&self) -> RepoResult<()> {
        self.repo.save_all(self.board.shifts(), self.board.tasks())
    }

    fn after_mutation(&self, operation: &str, changed: bool) {
        if !changed {
            info!("event={operation} module=service status=noop");
            return;
        }
        if let Err(err) = self.flush() {
            error!(
                "event=persist module=service status=error operation={operation} error_code=persist_failed error={err}"
            );
        }
    }
}

fn ensure_admin(acting: &MemberId) -> ServiceResult<()> {
    match find_member(acting) {
        Some(member) if member.is_admin => Ok(()),
        Some(_) => Err(ServiceError::NotAdmin(acting.clone())),
        None => Err(ServiceError::UnknownMember(acting.clone())),
    }
}
