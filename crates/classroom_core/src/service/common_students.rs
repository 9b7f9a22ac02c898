//! Common-student use-case service.
//!
//! # Responsibility
//! - Intersect the rosters of a set of teachers.
//!
//! # Invariants
//! - Repeated teacher emails count once.
//! - One unknown teacher fails the whole query; no partial results.

use crate::repo::user_repo::UserRepository;
use crate::service::directory::normalize_unique;
use crate::service::error::{ServiceError, ServiceResult};
use std::collections::BTreeSet;

/// Use-case service for roster intersections.
pub struct CommonStudentService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> CommonStudentService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns emails of students registered to every teacher in
    /// `teacher_emails`, sorted ascending.
    ///
    /// # Errors
    /// - `InvalidInput` for an empty list or an empty email.
    /// - `NotFound` when any requested teacher does not exist.
    pub fn list_common_students(&self, teacher_emails: &[String]) -> ServiceResult<Vec<String>> {
        if teacher_emails.is_empty() {
            return Err(ServiceError::InvalidInput(
                "at least one teacher is required".to_string(),
            ));
        }

        let requested = normalize_unique(teacher_emails)?;
        let teachers = self.repo.find_teachers(&requested)?;
        if teachers.len() < requested.len() {
            return Err(ServiceError::NotFound("teacher not found".to_string()));
        }

        let common = teachers
            .iter()
            .map(|teacher| {
                teacher
                    .roster_emails()
                    .iter()
                    .cloned()
                    .collect::<BTreeSet<_>>()
            })
            .reduce(|acc, roster| acc.intersection(&roster).cloned().collect())
            .unwrap_or_default();

        Ok(common.into_iter().collect())
    }
}
