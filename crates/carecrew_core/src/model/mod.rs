//! Household domain model for shifts, care tasks and the family roster.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep serialized field names compatible with persisted household data.
//!
//! # Invariants
//! - Every `CareTask` belongs to exactly one `FlightShift` via `shift_id`.
//! - `CareTask` ids are unique across the whole task collection.
//! - The family roster is a fixed seed list; members are never created at runtime.
//!
//! # See also
//! - DESIGN.md

pub mod member;
pub mod shift;
pub mod task;
