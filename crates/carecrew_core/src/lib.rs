//! Core domain logic for CareCrew, the household child-care planner.
//! This crate is the single source of truth for shift/task invariants.

pub mod config;
pub mod db;
pub mod extract;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig, GeminiConfig};
pub use extract::{
    ExtractionError, ExtractionResult, Extractor, GeminiClient, GenerationRequest,
    SuggestedTask, TextGenerator, ValidationError,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::member::{
    find_member, household_roster, is_known_member, ActingMember, FamilyMember, FamilyRole,
    MemberId,
};
pub use model::shift::{FlightShift, ShiftId, ShiftPatch, ShiftStatus};
pub use model::task::{CareTask, TaskId, TaskPatch, TaskType};
pub use repo::care_repo::{
    CareCollections, CareRepository, RepoError, RepoResult, SHIFTS_KEY, TASKS_KEY,
};
pub use service::board::{CareBoard, CascadeReport, CoverageStats, MergeCounts};
pub use service::household::{
    HouseholdService, ServiceError, ServiceResult, SyncFailure, SyncReport, SyncTicket,
};
pub use service::reconcile::{reconcile, Clock, FixedClock, ReconciledBatch, SystemClock};
pub use store::{KeyValueStore, MemoryStore, SqliteStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
