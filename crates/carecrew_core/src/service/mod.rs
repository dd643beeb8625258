//! Core use-case services.
//!
//! # Responsibility
//! - Turn extraction output into domain records.
//! - Apply assignment and edit operations to the live collections.
//! - Orchestrate persistence and sync for UI/CLI callers.

pub mod board;
pub mod household;
pub mod reconcile;
