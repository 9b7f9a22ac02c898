//! Identity model for the classroom directory.
//!
//! # Responsibility
//! - Define the shared identity space and its two role variants.
//! - Own email normalization so every layer compares identities the same way.
//!
//! # Invariants
//! - Every identity is keyed by its normalized (lowercase) email.
//! - One email maps to at most one identity across both roles.

pub mod user;
