//! Directory use-case service.
//!
//! # Responsibility
//! - Resolve identities by email, constructing unsaved ones when absent.
//! - Flip the suspension flag of existing students.
//!
//! # Invariants
//! - Find-or-create never persists; saving is the caller's job.
//! - Batched resolution returns one student per distinct normalized email.

use crate::model::user::{checked_email, Student, Teacher};
use crate::repo::user_repo::{RepoError, UserRepository};
use crate::service::error::{ServiceError, ServiceResult};
use log::info;
use std::collections::{HashMap, HashSet};

/// Resolves the teacher for `email`, or builds an unsaved one with an empty
/// roster.
pub fn find_or_create_teacher<R: UserRepository + ?Sized>(
    repo: &R,
    email: &str,
) -> ServiceResult<Teacher> {
    let email = checked_email(email)?;
    match repo.find_teacher(&email)? {
        Some(teacher) => Ok(teacher),
        None => Ok(Teacher::new(&email)?),
    }
}

/// Resolves one student per distinct email with a single batched lookup.
///
/// Emails are normalized and deduplicated first, keeping first-occurrence
/// order. Students not found are built unsaved and active.
pub fn find_or_create_students<R: UserRepository + ?Sized>(
    repo: &R,
    emails: &[String],
) -> ServiceResult<Vec<Student>> {
    if emails.is_empty() {
        return Ok(Vec::new());
    }

    let normalized = normalize_unique(emails)?;
    let mut existing = repo
        .find_students(&normalized)?
        .into_iter()
        .map(|s| (s.email.clone(), s))
        .collect::<HashMap<_, _>>();

    let mut students = Vec::with_capacity(normalized.len());
    for email in &normalized {
        match existing.remove(email) {
            Some(student) => students.push(student),
            None => students.push(Student::new(email)?),
        }
    }

    Ok(students)
}

/// Normalizes and deduplicates `emails`, rejecting any empty entry.
pub fn normalize_unique(emails: &[String]) -> ServiceResult<Vec<String>> {
    let mut seen = HashSet::with_capacity(emails.len());
    let mut unique = Vec::with_capacity(emails.len());
    for email in emails {
        let email = checked_email(email)?;
        if seen.insert(email.clone()) {
            unique.push(email);
        }
    }
    Ok(unique)
}

/// Use-case service wrapper for identity resolution.
pub struct DirectoryService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> DirectoryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// See [`find_or_create_teacher`].
    pub fn find_or_create_teacher(&self, email: &str) -> ServiceResult<Teacher> {
        find_or_create_teacher(&self.repo, email)
    }

    /// See [`find_or_create_students`].
    pub fn find_or_create_students(&self, emails: &[String]) -> ServiceResult<Vec<Student>> {
        find_or_create_students(&self.repo, emails)
    }

    /// Marks an existing student as suspended.
    ///
    /// # Errors
    /// - `InvalidInput` for an empty email.
    /// - `NotFound` when no student has this email; nothing is written.
    pub fn suspend_student(&mut self, email: &str) -> ServiceResult<()> {
        let email = checked_email(email)?;
        match self.repo.set_suspended(&email, true) {
            Ok(()) => {
                info!("event=student_suspend module=service status=ok");
                Ok(())
            }
            Err(RepoError::NotFound(_)) => Err(ServiceError::NotFound(
                "student not found".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }
}
