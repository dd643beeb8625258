//! Shift/task collection repository over a key-value store.
//!
//! # Responsibility
//! - Load both collections once at startup.
//! - Serialize and write each collection to its named slot.
//!
//! # Invariants
//! - A slot that was never written loads as an empty collection.
//! - A slot holding unparsable data is rejected, never masked as empty.
//! - Shift and task slots are written independently (no cross-slot transaction).

use crate::model::shift::FlightShift;
use crate::model::task::CareTask;
use crate::store::{KeyValueStore, StoreError};
use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot holding the serialized shift collection.
pub const SHIFTS_KEY: &str = "family_alma_v5";
/// Slot holding the serialized task collection.
pub const TASKS_KEY: &str = "tasks_alma_v5";

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    InvalidData { key: &'static str, message: String },
    Encode(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::InvalidData { key, message } => {
                write!(f, "invalid persisted data in slot `{key}`: {message}")
            }
            Self::Encode(err) => write!(f, "failed to encode collection: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::InvalidData { .. } => None,
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Both persisted collections, in stored order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CareCollections {
    pub shifts: Vec<FlightShift>,
    pub tasks: Vec<CareTask>,
}

/// Repository for the shift and task slots.
pub struct CareRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> CareRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads both slots.
    pub fn load(&self) -> RepoResult<CareCollections> {
        let shifts = self.load_slot::<FlightShift>(SHIFTS_KEY)?;
        let tasks = self.load_slot::<CareTask>(TASKS_KEY)?;
        debug!(
            "event=repo_load module=repo status=ok shifts={} tasks={}",
            shifts.len(),
            tasks.len()
        );
        Ok(CareCollections { shifts, tasks })
    }

    pub fn save_shifts(&self, shifts: &[FlightShift]) -> RepoResult<()> {
        self.save_slot(SHIFTS_KEY, shifts)
    }

    pub fn save_tasks(&self, tasks: &[CareTask]) -> RepoResult<()> {
        self.save_slot(TASKS_KEY, tasks)
    }

    /// Writes shifts, then tasks. A failure after the first write leaves
    /// the slots out of step.
    pub fn save_all(&self, shifts: &[FlightShift], tasks: &[CareTask]) -> RepoResult<()> {
        self.save_shifts(shifts)?;
        self.save_tasks(tasks)
    }

    fn load_slot<T: DeserializeOwned>(&self, key: &'static str) -> RepoResult<Vec<T>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|err| {
            error!(
                "event=repo_load module=repo status=error key={key} error_code=invalid_slot_data error={err}"
            );
            RepoError::InvalidData {
                key,
                message: err.to_string(),
            }
        })
    }

    fn save_slot<T: Serialize>(&self, key: &'static str, items: &[T]) -> RepoResult<()> {
        let encoded = serde_json::to_string(items).map_err(RepoError::Encode)?;
        self.store.set(key, &encoded)?;
        debug!(
            "event=repo_save module=repo status=ok key={key} items={}",
            items.len()
        );
        Ok(())
    }
}
