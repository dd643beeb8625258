//! Persistence of the household collections.
//!
//! # Responsibility
//! - Map in-memory collections onto named key-value slots.
//! - Keep serialization details out of service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`InvalidData`) in addition to
//!   store transport errors.

pub mod care_repo;
