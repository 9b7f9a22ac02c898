//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the directory's four use cases.
//! - Keep transport layers decoupled from storage details.
//!
//! # Invariants
//! - Services normalize every email before it reaches a repository.
//! - Input validation completes before any storage mutation.

pub mod common_students;
pub mod directory;
pub mod error;
pub mod mention;
pub mod notification;
pub mod registration;
