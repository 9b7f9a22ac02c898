//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce model validation before persistence.
//! - Callers pass already-normalized emails; repositories never re-normalize.
//! - Repository APIs return semantic errors (`NotFound`, `RoleConflict`) in
//!   addition to DB transport errors.

pub mod user_repo;
